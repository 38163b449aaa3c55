use anyhow::anyhow;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bincode::serde::encode_to_vec;
use solana_sdk::transaction::VersionedTransaction;
use tracing::info;

use crate::lander::RpcLander;

use super::builder::PreparedExecution;
use super::error::{ExecuteError, ExecuteResult};
use super::identity::SignerIdentity;

/// 执行结果的两条终态：本地签名并广播成功，或序列化后移交
/// 外部签名人。移交之后本子系统的职责即告结束。
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Submitted { signature: String },
    Delegated { transaction_base64: String },
}

pub struct SigningCoordinator {
    lander: RpcLander,
    allow_delegated: bool,
}

impl SigningCoordinator {
    pub fn new(lander: RpcLander, allow_delegated: bool) -> Self {
        Self {
            lander,
            allow_delegated,
        }
    }

    /// 按签名身份分派，两条路径互斥：本地身份绝不返回 Delegated，
    /// 委托身份绝不触达广播。
    pub async fn sign_and_dispatch(
        &self,
        prepared: PreparedExecution,
        identity: &SignerIdentity,
    ) -> ExecuteResult<ExecutionResult> {
        match identity {
            SignerIdentity::Local(keypair) => {
                let signed =
                    VersionedTransaction::try_new(prepared.transaction.message, &[keypair.as_ref()])
                        .map_err(|err| ExecuteError::Signing(anyhow!(err)))?;

                let signature = self
                    .lander
                    .submit(&signed)
                    .await
                    .map_err(ExecuteError::Broadcast)?;

                info!(
                    target: "executor::coordinator",
                    signature = %signature,
                    index = prepared.transaction_index,
                    blockhash = %prepared.blockhash,
                    "本地签名并广播完成"
                );

                Ok(ExecutionResult::Submitted {
                    signature: signature.to_string(),
                })
            }
            SignerIdentity::Delegated { authority } => {
                if !self.allow_delegated {
                    return Err(ExecuteError::ModeMismatch(
                        "当前上下文不支持委托签名（wallet.allow_delegated = false）".to_string(),
                    ));
                }

                let payload = encode_unsigned_transaction(&prepared.transaction)
                    .map_err(|err| ExecuteError::Signing(anyhow!("序列化交易失败: {err}")))?;

                info!(
                    target: "executor::coordinator",
                    authority = %authority,
                    index = prepared.transaction_index,
                    payload_len = payload.len(),
                    "交易已序列化，移交外部签名人"
                );

                Ok(ExecutionResult::Delegated {
                    transaction_base64: payload,
                })
            }
        }
    }
}

/// 移交外部签名人的传输格式：bincode（固定整型宽度，与链上
/// 线格式一致）+ base64。
fn encode_unsigned_transaction(
    tx: &VersionedTransaction,
) -> Result<String, bincode::error::EncodeError> {
    let bytes = encode_to_vec(tx, bincode_config())?;
    Ok(BASE64_STANDARD.encode(bytes))
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

#[cfg(test)]
pub(crate) fn decode_unsigned_transaction(encoded: &str) -> VersionedTransaction {
    let bytes = BASE64_STANDARD.decode(encoded).expect("base64 decode");
    let (tx, _) = bincode::serde::decode_from_slice::<VersionedTransaction, _>(
        &bytes,
        bincode_config(),
    )
    .expect("bincode decode");
    tx
}
