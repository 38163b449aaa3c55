use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use super::pda::SQUADS_PROGRAM_ID;

/// Anchor sighash：sha256("global:vault_transaction_execute") 前 8 字节。
const VAULT_TRANSACTION_EXECUTE_DISCRIMINATOR: [u8; 8] = [194, 8, 161, 87, 153, 164, 25, 171];

#[derive(Debug, Clone, Copy)]
pub struct VaultTransactionExecuteAccounts {
    pub multisig: Pubkey,
    pub proposal: Pubkey,
    pub transaction: Pubkey,
    /// 执行成员，同时作为交易签名人。
    pub member: Pubkey,
    pub vault: Pubkey,
}

pub fn vault_transaction_execute(accounts: VaultTransactionExecuteAccounts) -> Instruction {
    Instruction {
        program_id: SQUADS_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(accounts.multisig, false),
            AccountMeta::new(accounts.proposal, false),
            AccountMeta::new_readonly(accounts.transaction, false),
            AccountMeta::new_readonly(accounts.member, true),
            AccountMeta::new(accounts.vault, false),
        ],
        data: VAULT_TRANSACTION_EXECUTE_DISCRIMINATOR.to_vec(),
    }
}
