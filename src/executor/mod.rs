mod builder;
mod coordinator;
mod error;
mod identity;
mod resolver;
#[cfg(test)]
mod tests;

pub use builder::{BuildError, ExecutionBuilder, PreparedExecution};
pub use coordinator::{ExecutionResult, SigningCoordinator};
pub use error::{ExecuteError, ExecuteResult};
pub use identity::SignerIdentity;
pub use resolver::{ResolvedProposal, resolve};

use std::str::FromStr;
use std::sync::Arc;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::config::{ComputeBudgetConfig, ConfigError, GlobalConfig, LanderConfig};
use crate::lander::RpcLander;

/// 一次执行所需的全部依赖与配置，显式传入。没有全局"当前签名人"，
/// 并发执行不同账户时身份不会互相污染。
#[derive(Clone)]
pub struct ExecutorContext {
    pub rpc: Arc<RpcClient>,
    /// 多签派生种子（创建者公钥）。
    pub create_key: Pubkey,
    pub vault_index: u8,
    /// 当前上下文是否支持委托签名模式。
    pub allow_delegated: bool,
    pub lander: LanderConfig,
    pub compute_budget: ComputeBudgetConfig,
}

impl ExecutorContext {
    pub fn from_config(rpc: Arc<RpcClient>, global: &GlobalConfig) -> Result<Self, ConfigError> {
        let raw = global.multisig.create_key.trim();
        if raw.is_empty() {
            return Err(ConfigError::Invalid {
                field: "multisig.create_key",
                message: "缺少多签派生种子".to_string(),
            });
        }
        let create_key = Pubkey::from_str(raw).map_err(|err| ConfigError::Invalid {
            field: "multisig.create_key",
            message: err.to_string(),
        })?;

        Ok(Self {
            rpc,
            create_key,
            vault_index: global.multisig.vault_index,
            allow_delegated: global.wallet.allow_delegated,
            lander: global.lander.clone(),
            compute_budget: global.compute_budget,
        })
    }
}

/// 端到端执行入口：解析索引 → 构建交易 → 按身份分派签名，
/// 本地路径继续广播。任一阶段失败按原分类上抛，内部不重试。
pub async fn execute_proposal(
    ctx: &ExecutorContext,
    identity: &SignerIdentity,
    requested_index: Option<u64>,
) -> ExecuteResult<ExecutionResult> {
    let resolved = resolver::resolve(&ctx.rpc, &ctx.create_key, requested_index).await?;

    let builder = ExecutionBuilder::new(ctx.rpc.clone(), ctx.vault_index, ctx.compute_budget);
    let prepared = builder
        .build(
            &resolved.multisig_pda,
            resolved.transaction_index,
            &identity.fee_payer(),
        )
        .await?;

    info!(
        target: "executor",
        multisig = %resolved.multisig_pda,
        index = resolved.transaction_index,
        delegated = identity.is_delegated(),
        "执行交易已就绪，进入签名分派"
    );

    let lander = RpcLander::new(ctx.rpc.clone(), &ctx.lander);
    let coordinator = SigningCoordinator::new(lander, ctx.allow_delegated);
    coordinator.sign_and_dispatch(prepared, identity).await
}
