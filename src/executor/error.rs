use thiserror::Error;

use crate::lander::LanderError;
use crate::multisig::MultisigError;

use super::builder::BuildError;

/// 执行各阶段的失败分类。每个分类保留原始原因，阶段之间不混用，
/// 内部一律不重试：是否重新解析索引、重建交易由调用方决定。
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("提案解析失败: {0}")]
    Resolution(#[source] MultisigError),
    #[error("交易构建失败: {0}")]
    Build(#[source] BuildError),
    #[error("签名失败: {0}")]
    Signing(#[source] anyhow::Error),
    #[error("签名模式不匹配: {0}")]
    ModeMismatch(String),
    #[error("交易广播失败: {0}")]
    Broadcast(#[source] LanderError),
}

pub type ExecuteResult<T> = Result<T, ExecuteError>;
