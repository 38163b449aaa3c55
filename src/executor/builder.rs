use std::sync::Arc;

use anyhow::anyhow;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::VersionedMessage;
use solana_sdk::message::v0::Message as V0Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;
use tracing::debug;

use crate::config::ComputeBudgetConfig;
use crate::multisig::{self, VaultTransactionExecuteAccounts};

use super::error::{ExecuteError, ExecuteResult};

const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ComputeBudget111111111111111111111111111111");

/// 构建产物：绑定了新 blockhash 的未签名执行交易，纯值，
/// 构建本身不改变链上状态。
#[derive(Clone)]
pub struct PreparedExecution {
    pub transaction: VersionedTransaction,
    pub blockhash: Hash,
    pub transaction_index: u64,
    pub multisig_pda: Pubkey,
    pub vault: Pubkey,
    pub fee_payer: Pubkey,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("获取最新 blockhash 失败: {0}")]
    Blockhash(#[source] ClientError),
    #[error("编译交易消息失败: {0}")]
    Compile(#[source] anyhow::Error),
}

#[derive(Clone)]
pub struct ExecutionBuilder {
    rpc: Arc<RpcClient>,
    vault_index: u8,
    compute_budget: ComputeBudgetConfig,
}

impl ExecutionBuilder {
    pub fn new(rpc: Arc<RpcClient>, vault_index: u8, compute_budget: ComputeBudgetConfig) -> Self {
        Self {
            rpc,
            vault_index,
            compute_budget,
        }
    }

    /// 每次调用都重新拉取 blockhash，绝不跨调用复用；金库、交易、
    /// 提案地址均为纯派生，这里不再读任何账户。
    pub async fn build(
        &self,
        multisig_pda: &Pubkey,
        transaction_index: u64,
        fee_payer: &Pubkey,
    ) -> ExecuteResult<PreparedExecution> {
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|err| ExecuteError::Build(BuildError::Blockhash(err)))?;

        let vault = multisig::vault_pda(multisig_pda, self.vault_index);
        let transaction = multisig::transaction_pda(multisig_pda, transaction_index);
        let proposal = multisig::proposal_pda(multisig_pda, transaction_index);

        let mut instructions = Vec::with_capacity(3);
        if self.compute_budget.unit_limit > 0 {
            instructions.push(compute_unit_limit_instruction(self.compute_budget.unit_limit));
        }
        if self.compute_budget.unit_price_micro_lamports > 0 {
            instructions.push(compute_unit_price_instruction(
                self.compute_budget.unit_price_micro_lamports,
            ));
        }
        instructions.push(multisig::vault_transaction_execute(
            VaultTransactionExecuteAccounts {
                multisig: *multisig_pda,
                proposal,
                transaction,
                member: *fee_payer,
                vault,
            },
        ));

        let message = compile_message(fee_payer, &instructions, blockhash)?;

        debug!(
            target: "executor::builder",
            multisig = %multisig_pda,
            index = transaction_index,
            blockhash = %blockhash,
            vault = %vault,
            "执行交易构建完成"
        );

        Ok(PreparedExecution {
            transaction: unsigned_transaction(message),
            blockhash,
            transaction_index,
            multisig_pda: *multisig_pda,
            vault,
            fee_payer: *fee_payer,
        })
    }
}

fn compile_message(
    payer: &Pubkey,
    instructions: &[Instruction],
    blockhash: Hash,
) -> ExecuteResult<VersionedMessage> {
    V0Message::try_compile(payer, instructions, &[], blockhash)
        .map(VersionedMessage::V0)
        .map_err(|err| ExecuteError::Build(BuildError::Compile(anyhow!(err))))
}

/// 占位签名填满要求的数量，保持序列化布局，由签名阶段替换。
fn unsigned_transaction(message: VersionedMessage) -> VersionedTransaction {
    let required = message.header().num_required_signatures as usize;
    VersionedTransaction {
        signatures: vec![Signature::default(); required],
        message,
    }
}

fn compute_unit_limit_instruction(limit: u32) -> Instruction {
    let mut data = Vec::with_capacity(5);
    data.push(2);
    data.extend_from_slice(&limit.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

fn compute_unit_price_instruction(price_micro_lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(3);
    data.extend_from_slice(&price_micro_lamports.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}
