use solana_client::client_error::ClientError;
use thiserror::Error;

/// 广播失败，保留 RPC 节点返回的拒绝原因（blockhash 过期、
/// 签名不足、提案不存在等）。
#[derive(Debug, Error)]
pub enum LanderError {
    #[error("RPC 提交失败: {0}")]
    Rpc(#[from] ClientError),
}
