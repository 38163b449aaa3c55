use std::sync::Arc;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use tracing::info;

use crate::config::LanderConfig;

use super::error::LanderError;

#[derive(Clone)]
pub struct RpcLander {
    client: Arc<RpcClient>,
    config: RpcSendTransactionConfig,
}

impl RpcLander {
    pub fn new(client: Arc<RpcClient>, settings: &LanderConfig) -> Self {
        let config = RpcSendTransactionConfig {
            skip_preflight: settings.skip_preflight,
            max_retries: Some(settings.max_retries),
            min_context_slot: settings.min_context_slot,
            ..RpcSendTransactionConfig::default()
        };

        Self { client, config }
    }

    /// 单次提交。重试策略属于调用方：同一份字节在 blockhash 过期后
    /// 重发必然失败，必须重新解析索引并重建交易。
    pub async fn submit(&self, tx: &VersionedTransaction) -> Result<Signature, LanderError> {
        let signature = self
            .client
            .send_transaction_with_config(tx, self.config.clone())
            .await?;

        info!(
            target: "lander::rpc",
            signature = %signature,
            endpoint = %self.client.url(),
            skip_preflight = self.config.skip_preflight,
            max_retries = ?self.config.max_retries,
            min_context_slot = ?self.config.min_context_slot,
            "交易已通过 RPC 提交"
        );

        Ok(signature)
    }
}
