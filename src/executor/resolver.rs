use std::sync::Arc;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::multisig::{self, Multisig};

use super::error::{ExecuteError, ExecuteResult};

/// 单次账户读取得到的解析结果。state 与索引来自同一次读取，
/// 不存在两次读取观察到不同状态的窗口。
#[derive(Debug, Clone)]
pub struct ResolvedProposal {
    pub multisig_pda: Pubkey,
    pub transaction_index: u64,
    pub state: Multisig,
}

/// 解析要执行的提案索引。显式传入的索引原样使用、不做钳制；
/// 缺省时取账户当前最高索引，即"执行最新提案"。
pub async fn resolve(
    rpc: &Arc<RpcClient>,
    create_key: &Pubkey,
    requested_index: Option<u64>,
) -> ExecuteResult<ResolvedProposal> {
    let multisig_pda = multisig::multisig_pda(create_key);
    let state = multisig::fetch_multisig(rpc, &multisig_pda)
        .await
        .map_err(ExecuteError::Resolution)?;

    let transaction_index = requested_index.unwrap_or(state.transaction_index);

    debug!(
        target: "executor::resolver",
        multisig = %multisig_pda,
        current_index = state.transaction_index,
        requested = ?requested_index,
        resolved = transaction_index,
        "提案索引解析完成"
    );

    Ok(ResolvedProposal {
        multisig_pda,
        transaction_index,
        state,
    })
}
