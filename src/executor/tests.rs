use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::{Value, json};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::config::{ComputeBudgetConfig, LanderConfig};
use crate::lander::RpcLander;
use crate::multisig::{self, Member, Multisig, Permissions, SQUADS_PROGRAM_ID};

use super::coordinator::decode_unsigned_transaction;
use super::*;

const MOCK_SIGNATURE: &str =
    "43yNSFC6fYTuPgTNFFhF4axw7AfWxB2BPdurme8yrsWEYwm8299xh8n6TAHjGymiSub1XtyxTNyd9GBfY2hxoBw8";

fn sample_state(create_key: Pubkey, transaction_index: u64, member: Pubkey) -> Multisig {
    Multisig {
        create_key,
        config_authority: Pubkey::default(),
        threshold: 2,
        time_lock: 0,
        transaction_index,
        stale_transaction_index: 0,
        rent_collector: None,
        bump: 255,
        members: vec![Member {
            key: member,
            permissions: Permissions {
                mask: Permissions::INITIATE | Permissions::VOTE | Permissions::EXECUTE,
            },
        }],
    }
}

fn multisig_account_mock(state: &Multisig) -> Value {
    let data = state.to_account_data();
    json!({
        "context": { "slot": 1 },
        "value": {
            "lamports": 3_480_000u64,
            "data": [BASE64_STANDARD.encode(&data), "base64"],
            "owner": SQUADS_PROGRAM_ID.to_string(),
            "executable": false,
            "rentEpoch": 0u64,
            "space": data.len(),
        }
    })
}

fn blockhash_mock(hash: &Hash) -> Value {
    json!({
        "context": { "slot": 1 },
        "value": {
            "blockhash": hash.to_string(),
            "lastValidBlockHeight": 100u64,
        }
    })
}

fn mock_rpc(mocks: HashMap<RpcRequest, Value>) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_mock_with_mocks("succeeds".to_string(), mocks))
}

fn make_context(rpc: Arc<RpcClient>, create_key: Pubkey, allow_delegated: bool) -> ExecutorContext {
    ExecutorContext {
        rpc,
        create_key,
        vault_index: 0,
        allow_delegated,
        lander: LanderConfig::default(),
        compute_budget: ComputeBudgetConfig::default(),
    }
}

#[tokio::test]
async fn resolves_current_index_when_unspecified() {
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, Pubkey::new_unique());
    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
    let rpc = mock_rpc(mocks);

    let resolved = resolve(&rpc, &create_key, None).await.expect("resolve");
    assert_eq!(resolved.transaction_index, 7);
    assert_eq!(resolved.multisig_pda, multisig::multisig_pda(&create_key));
    assert_eq!(resolved.state.threshold, 2);
}

#[tokio::test]
async fn explicit_index_is_used_verbatim_without_clamping() {
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, Pubkey::new_unique());

    for requested in [3u64, 12u64] {
        let mut mocks = HashMap::new();
        mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
        let rpc = mock_rpc(mocks);

        let resolved = resolve(&rpc, &create_key, Some(requested))
            .await
            .expect("resolve");
        assert_eq!(resolved.transaction_index, requested);
    }
}

#[tokio::test]
async fn missing_account_is_a_resolution_error() {
    let create_key = Pubkey::new_unique();
    let mut mocks = HashMap::new();
    mocks.insert(
        RpcRequest::GetAccountInfo,
        json!({ "context": { "slot": 1 }, "value": null }),
    );
    let rpc = mock_rpc(mocks);

    let err = resolve(&rpc, &create_key, None).await.expect_err("reject");
    assert!(matches!(err, ExecuteError::Resolution(_)));
}

#[tokio::test]
async fn build_binds_fresh_blockhash_per_call() {
    let first_hash = Hash::new_unique();
    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetLatestBlockhash, blockhash_mock(&first_hash));
    let rpc = mock_rpc(mocks);

    let builder = ExecutionBuilder::new(rpc, 0, ComputeBudgetConfig::default());
    let multisig_pda = Pubkey::new_unique();
    let payer = Pubkey::new_unique();

    let first = builder
        .build(&multisig_pda, 1, &payer)
        .await
        .expect("first build");
    // 第二次构建命中 mock 默认的 blockhash，与第一次不同
    let second = builder
        .build(&multisig_pda, 1, &payer)
        .await
        .expect("second build");

    assert_eq!(first.blockhash, first_hash);
    assert_ne!(first.blockhash, second.blockhash);

    assert_eq!(first.multisig_pda, multisig_pda);
    assert_eq!(first.transaction_index, 1);
    assert_eq!(first.fee_payer, payer);
    assert_eq!(first.vault, multisig::vault_pda(&multisig_pda, 0));
}

#[tokio::test]
async fn build_prefixes_configured_compute_budget() {
    let mut mocks = HashMap::new();
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    let rpc = mock_rpc(mocks);

    let compute_budget = ComputeBudgetConfig {
        unit_limit: 400_000,
        unit_price_micro_lamports: 5_000,
    };
    let builder = ExecutionBuilder::new(rpc, 0, compute_budget);
    let prepared = builder
        .build(&Pubkey::new_unique(), 1, &Pubkey::new_unique())
        .await
        .expect("build");

    let instructions = prepared.transaction.message.instructions();
    assert_eq!(instructions.len(), 3);
    // 最后一条是执行指令本身
    let program_ids = prepared.transaction.message.static_account_keys();
    let execute_ix = instructions.last().expect("execute instruction");
    assert_eq!(
        program_ids[execute_ix.program_id_index as usize],
        SQUADS_PROGRAM_ID
    );
}

#[tokio::test]
async fn scenario_local_key_executes_latest_proposal() {
    let keypair = Keypair::new();
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, keypair.pubkey());

    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    mocks.insert(RpcRequest::SendTransaction, json!(MOCK_SIGNATURE));
    let ctx = make_context(mock_rpc(mocks), create_key, false);
    let identity = SignerIdentity::Local(Arc::new(keypair));

    let result = execute_proposal(&ctx, &identity, None)
        .await
        .expect("execute");

    match result {
        ExecutionResult::Submitted { signature } => {
            assert!(!signature.is_empty());
            assert_eq!(signature, MOCK_SIGNATURE);
        }
        other => panic!("期望 Submitted，得到 {other:?}"),
    }
}

#[tokio::test]
async fn scenario_delegated_executes_requested_index() {
    let authority = Pubkey::new_unique();
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, authority);
    let bound_hash = Hash::new_unique();

    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
    mocks.insert(RpcRequest::GetLatestBlockhash, blockhash_mock(&bound_hash));
    let ctx = make_context(mock_rpc(mocks), create_key, true);
    let identity = SignerIdentity::Delegated { authority };

    let result = execute_proposal(&ctx, &identity, Some(3))
        .await
        .expect("execute");

    let payload = match result {
        ExecutionResult::Delegated { transaction_base64 } => transaction_base64,
        other => panic!("期望 Delegated，得到 {other:?}"),
    };
    assert!(!payload.is_empty());

    // 载荷里是针对索引 3（而非账户当前的 7）的未签名执行交易
    let tx = decode_unsigned_transaction(&payload);
    let multisig_pda = multisig::multisig_pda(&create_key);
    let keys = tx.message.static_account_keys();
    assert!(keys.contains(&multisig::transaction_pda(&multisig_pda, 3)));
    assert!(keys.contains(&multisig::proposal_pda(&multisig_pda, 3)));
    assert!(!keys.contains(&multisig::transaction_pda(&multisig_pda, 7)));
    assert_eq!(keys[0], authority);
    assert_eq!(tx.message.recent_blockhash(), &bound_hash);
}

#[tokio::test]
async fn scenario_account_fetch_failure_stops_before_build() {
    let rpc = Arc::new(RpcClient::new_mock("fails".to_string()));
    let ctx = make_context(rpc, Pubkey::new_unique(), false);
    let identity = SignerIdentity::Local(Arc::new(Keypair::new()));

    let err = execute_proposal(&ctx, &identity, None)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExecuteError::Resolution(_)));
}

#[tokio::test]
async fn scenario_ledger_rejection_surfaces_as_broadcast_error() {
    let keypair = Keypair::new();
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, keypair.pubkey());

    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    // 节点拒绝提交：响应无法解析出签名
    mocks.insert(RpcRequest::SendTransaction, Value::Null);
    let ctx = make_context(mock_rpc(mocks), create_key, false);
    let identity = SignerIdentity::Local(Arc::new(keypair));

    let err = execute_proposal(&ctx, &identity, None)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExecuteError::Broadcast(_)));
}

#[tokio::test]
async fn delegated_mode_rejected_when_context_disallows() {
    let authority = Pubkey::new_unique();
    let create_key = Pubkey::new_unique();
    let state = sample_state(create_key, 7, authority);

    let mut mocks = HashMap::new();
    mocks.insert(RpcRequest::GetAccountInfo, multisig_account_mock(&state));
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    let ctx = make_context(mock_rpc(mocks), create_key, false);
    let identity = SignerIdentity::Delegated { authority };

    let err = execute_proposal(&ctx, &identity, None)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExecuteError::ModeMismatch(_)));
}

#[tokio::test]
async fn delegated_path_never_touches_the_wire() {
    let mut mocks = HashMap::new();
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    let builder = ExecutionBuilder::new(mock_rpc(mocks), 0, ComputeBudgetConfig::default());
    let authority = Pubkey::new_unique();
    let prepared = builder
        .build(&Pubkey::new_unique(), 4, &authority)
        .await
        .expect("build");

    // lander 指向一个任何请求都会失败的客户端；委托路径不触网即不报错
    let rpc_fails = Arc::new(RpcClient::new_mock("fails".to_string()));
    let lander = RpcLander::new(rpc_fails, &LanderConfig::default());
    let coordinator = SigningCoordinator::new(lander, true);

    let result = coordinator
        .sign_and_dispatch(prepared, &SignerIdentity::Delegated { authority })
        .await
        .expect("delegated dispatch");
    assert!(matches!(result, ExecutionResult::Delegated { .. }));
}

#[tokio::test]
async fn local_signing_fails_on_member_mismatch() {
    let mut mocks = HashMap::new();
    mocks.insert(
        RpcRequest::GetLatestBlockhash,
        blockhash_mock(&Hash::new_unique()),
    );
    let builder = ExecutionBuilder::new(mock_rpc(mocks), 0, ComputeBudgetConfig::default());
    // 交易声明的付款人与实际持有的私钥不一致
    let declared_payer = Pubkey::new_unique();
    let prepared = builder
        .build(&Pubkey::new_unique(), 2, &declared_payer)
        .await
        .expect("build");

    let lander = RpcLander::new(
        Arc::new(RpcClient::new_mock("succeeds".to_string())),
        &LanderConfig::default(),
    );
    let coordinator = SigningCoordinator::new(lander, false);
    let identity = SignerIdentity::Local(Arc::new(Keypair::new()));

    let err = coordinator
        .sign_and_dispatch(prepared, &identity)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExecuteError::Signing(_)));
}
