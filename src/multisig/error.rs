use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultisigError {
    #[error("拉取多签账户失败: {0}")]
    Rpc(#[from] ClientError),
    #[error("多签账户不存在: {0}")]
    AccountNotFound(Pubkey),
    #[error("账户 discriminator 不匹配，地址上不是 {expected} 账户")]
    Discriminator { expected: &'static str },
    #[error("反序列化多签账户失败: {0}")]
    Deserialize(#[source] std::io::Error),
}

pub type MultisigResult<T> = Result<T, MultisigError>;
