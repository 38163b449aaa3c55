mod loader;

pub use loader::{ConfigError, DEFAULT_CONFIG_PATHS, load_config};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CenturionConfig {
    pub global: GlobalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub logging: LoggingConfig,
    pub wallet: WalletConfig,
    pub multisig: MultisigConfig,
    pub lander: LanderConfig,
    pub compute_budget: ComputeBudgetConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            logging: LoggingConfig::default(),
            wallet: WalletConfig::default(),
            multisig: MultisigConfig::default(),
            lander: LanderConfig::default(),
            compute_budget: ComputeBudgetConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// 签名身份配置。private_key 与 delegated_authority 互斥，同时配置
/// 或都缺省会在构建身份时被拒绝。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub private_key: String,
    pub delegated_authority: String,
    pub allow_delegated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MultisigConfig {
    /// 多签派生种子，创建者 create_key 公钥。
    pub create_key: String,
    pub vault_index: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanderConfig {
    pub skip_preflight: bool,
    /// RPC 节点侧重发次数，0 表示单次提交。
    pub max_retries: usize,
    pub min_context_slot: Option<u64>,
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            max_retries: 0,
            min_context_slot: None,
        }
    }
}

/// 0 表示不附加对应的 compute budget 指令。
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ComputeBudgetConfig {
    pub unit_limit: u32,
    pub unit_price_micro_lamports: u64,
}
