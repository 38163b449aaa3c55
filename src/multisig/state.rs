use std::sync::Arc;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use super::error::{MultisigError, MultisigResult};

/// Anchor 账户 discriminator：sha256("account:Multisig") 前 8 字节。
const MULTISIG_DISCRIMINATOR: [u8; 8] = [224, 116, 121, 186, 68, 161, 79, 236];

/// 链上多签主账户状态。transaction_index 是权威的当前最高提案索引，
/// 单调不减，每次解析都重新拉取，绝不跨调用缓存。
#[derive(Debug, Clone)]
pub struct Multisig {
    pub create_key: Pubkey,
    pub config_authority: Pubkey,
    pub threshold: u16,
    pub time_lock: u32,
    pub transaction_index: u64,
    pub stale_transaction_index: u64,
    pub rent_collector: Option<Pubkey>,
    pub bump: u8,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Copy)]
pub struct Member {
    pub key: Pubkey,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub mask: u8,
}

impl Permissions {
    pub const INITIATE: u8 = 1 << 0;
    pub const VOTE: u8 = 1 << 1;
    pub const EXECUTE: u8 = 1 << 2;

    pub fn has(&self, permission: u8) -> bool {
        self.mask & permission != 0
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.has(Self::INITIATE) {
            parts.push("initiate");
        }
        if self.has(Self::VOTE) {
            parts.push("vote");
        }
        if self.has(Self::EXECUTE) {
            parts.push("execute");
        }
        parts.join("|")
    }
}

/// borsh 线格式布局，公钥按原始字节读出后再转成 Pubkey。
#[derive(BorshDeserialize, BorshSerialize)]
struct MultisigLayout {
    create_key: [u8; 32],
    config_authority: [u8; 32],
    threshold: u16,
    time_lock: u32,
    transaction_index: u64,
    stale_transaction_index: u64,
    rent_collector: Option<[u8; 32]>,
    bump: u8,
    members: Vec<MemberLayout>,
}

#[derive(BorshDeserialize, BorshSerialize)]
struct MemberLayout {
    key: [u8; 32],
    mask: u8,
}

impl Multisig {
    pub fn from_account_data(data: &[u8]) -> MultisigResult<Self> {
        let payload = data
            .strip_prefix(&MULTISIG_DISCRIMINATOR[..])
            .ok_or(MultisigError::Discriminator {
                expected: "Multisig",
            })?;

        // 账户缩容后可能留有尾部填充，这里按前缀读取而非要求精确长度
        let mut cursor = payload;
        let layout =
            MultisigLayout::deserialize(&mut cursor).map_err(MultisigError::Deserialize)?;

        Ok(Self {
            create_key: Pubkey::new_from_array(layout.create_key),
            config_authority: Pubkey::new_from_array(layout.config_authority),
            threshold: layout.threshold,
            time_lock: layout.time_lock,
            transaction_index: layout.transaction_index,
            stale_transaction_index: layout.stale_transaction_index,
            rent_collector: layout.rent_collector.map(Pubkey::new_from_array),
            bump: layout.bump,
            members: layout
                .members
                .into_iter()
                .map(|member| Member {
                    key: Pubkey::new_from_array(member.key),
                    permissions: Permissions { mask: member.mask },
                })
                .collect(),
        })
    }

    /// 测试用：反向生成账户镜像（discriminator + borsh 布局）。
    #[cfg(test)]
    pub(crate) fn to_account_data(&self) -> Vec<u8> {
        let layout = MultisigLayout {
            create_key: self.create_key.to_bytes(),
            config_authority: self.config_authority.to_bytes(),
            threshold: self.threshold,
            time_lock: self.time_lock,
            transaction_index: self.transaction_index,
            stale_transaction_index: self.stale_transaction_index,
            rent_collector: self.rent_collector.map(|key| key.to_bytes()),
            bump: self.bump,
            members: self
                .members
                .iter()
                .map(|member| MemberLayout {
                    key: member.key.to_bytes(),
                    mask: member.permissions.mask,
                })
                .collect(),
        };

        let mut data = MULTISIG_DISCRIMINATOR.to_vec();
        data.extend(borsh::to_vec(&layout).expect("serialize multisig layout"));
        data
    }
}

/// 单次读取多签账户状态。账户缺失与 RPC 失败分开上报。
pub async fn fetch_multisig(rpc: &Arc<RpcClient>, address: &Pubkey) -> MultisigResult<Multisig> {
    let response = rpc
        .get_account_with_commitment(address, rpc.commitment())
        .await
        .map_err(MultisigError::Rpc)?;

    let account = response
        .value
        .ok_or(MultisigError::AccountNotFound(*address))?;

    debug!(
        target: "multisig::state",
        address = %address,
        data_len = account.data.len(),
        "已拉取多签账户"
    );

    Multisig::from_account_data(&account.data)
}
