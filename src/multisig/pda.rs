use solana_sdk::pubkey::Pubkey;

/// Squads v4 程序地址。
pub const SQUADS_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf");

const SEED_PREFIX: &[u8] = b"multisig";
const SEED_MULTISIG: &[u8] = b"multisig";
const SEED_VAULT: &[u8] = b"vault";
const SEED_TRANSACTION: &[u8] = b"transaction";
const SEED_PROPOSAL: &[u8] = b"proposal";

/// 多签主账户地址，由创建者 create_key 派生。
pub fn multisig_pda(create_key: &Pubkey) -> Pubkey {
    let (address, _) = Pubkey::find_program_address(
        &[SEED_PREFIX, SEED_MULTISIG, create_key.as_ref()],
        &SQUADS_PROGRAM_ID,
    );
    address
}

/// 程序控制的金库地址，资产由多签批准的交易从这里划出。
pub fn vault_pda(multisig: &Pubkey, vault_index: u8) -> Pubkey {
    let (address, _) = Pubkey::find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_VAULT, &[vault_index]],
        &SQUADS_PROGRAM_ID,
    );
    address
}

/// 指定索引的金库交易账户地址。
pub fn transaction_pda(multisig: &Pubkey, transaction_index: u64) -> Pubkey {
    let (address, _) = Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
        ],
        &SQUADS_PROGRAM_ID,
    );
    address
}

/// 指定索引的提案账户地址。
pub fn proposal_pda(multisig: &Pubkey, transaction_index: u64) -> Pubkey {
    let (address, _) = Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
            SEED_PROPOSAL,
        ],
        &SQUADS_PROGRAM_ID,
    );
    address
}
