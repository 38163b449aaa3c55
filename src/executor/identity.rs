use std::env;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::config::WalletConfig;

use super::error::{ExecuteError, ExecuteResult};

/// 每次执行显式传入的签名身份，两种模式互斥、不可同时生效。
#[derive(Clone, Debug)]
pub enum SignerIdentity {
    /// 本进程持有私钥，同步签名并广播。
    Local(Arc<Keypair>),
    /// 仅持有外部签名人的公钥引用，交易序列化后移交，绝不在本进程签名。
    Delegated { authority: Pubkey },
}

impl SignerIdentity {
    /// 从钱包配置构建身份。private_key 与 delegated_authority 同时配置
    /// 或都缺省时直接拒绝，不触发任何网络调用。
    pub fn from_wallet(wallet: &WalletConfig) -> ExecuteResult<Self> {
        let private_key = resolve_private_key(wallet);
        let delegated = wallet.delegated_authority.trim();

        match (private_key, delegated.is_empty()) {
            (Some(_), false) => Err(ExecuteError::ModeMismatch(
                "private_key 与 delegated_authority 只能二选一".to_string(),
            )),
            (None, true) => Err(ExecuteError::ModeMismatch(
                "缺少签名身份，请配置 wallet.private_key（或环境变量 CENTURION_PRIVATE_KEY）\
                 或 wallet.delegated_authority"
                    .to_string(),
            )),
            (Some(raw), true) => {
                let keypair = parse_keypair_string(&raw)
                    .map_err(|err| ExecuteError::Signing(anyhow!("私钥解析失败: {err}")))?;
                Ok(Self::Local(Arc::new(keypair)))
            }
            (None, false) => {
                let authority = Pubkey::from_str(delegated).map_err(|err| {
                    ExecuteError::ModeMismatch(format!("delegated_authority 非法: {err}"))
                })?;
                Ok(Self::Delegated { authority })
            }
        }
    }

    /// 费用支付人兼多签执行成员，两种模式下都是确定值。
    pub fn fee_payer(&self) -> Pubkey {
        match self {
            Self::Local(keypair) => keypair.pubkey(),
            Self::Delegated { authority } => *authority,
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated { .. })
    }
}

fn resolve_private_key(wallet: &WalletConfig) -> Option<String> {
    if let Ok(value) = env::var("CENTURION_PRIVATE_KEY") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let configured = wallet.private_key.trim();
    (!configured.is_empty()).then(|| configured.to_string())
}

fn parse_keypair_string(raw: &str) -> Result<Keypair, anyhow::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("keypair string empty");
    }

    if trimmed.starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(trimmed)?;
        Ok(Keypair::try_from(bytes.as_slice())?)
    } else if trimmed.contains(',') {
        let bytes = trimmed
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Keypair::try_from(bytes.as_slice())?)
    } else {
        let data = bs58::decode(trimmed).into_vec()?;
        Ok(Keypair::try_from(data.as_slice())?)
    }
}
