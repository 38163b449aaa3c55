use std::{env, fs, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod executor;
mod lander;
mod multisig;

use config::{CenturionConfig, GlobalConfig, LoggingConfig, load_config};
use executor::{ExecutionResult, ExecutorContext, SignerIdentity, execute_proposal};

#[derive(Parser, Debug)]
#[command(name = "centurion", version, about = "Squads 多签提案执行机器人")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 centurion.toml 或 config/centurion.toml）"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 执行已批准的多签提案（缺省执行最新提案）
    Execute(ExecuteCmd),
    /// 查看多签账户当前状态
    Inspect,
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
struct ExecuteCmd {
    #[arg(long, help = "要执行的提案索引（缺省取账户当前最高索引）")]
    index: Option<u64>,
}

#[derive(Args, Debug)]
struct InitCmd {
    #[arg(long, value_name = "DIR", help = "可选输出目录（默认当前目录）")]
    output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone()).context("加载配置失败")?;
    init_tracing(&config.global.logging);

    match cli.command {
        Command::Execute(cmd) => run_execute(&config, cmd.index).await,
        Command::Inspect => run_inspect(&config).await,
        Command::Init(cmd) => init_configs(cmd),
    }
}

async fn run_execute(config: &CenturionConfig, index: Option<u64>) -> Result<()> {
    let global = &config.global;
    let identity = SignerIdentity::from_wallet(&global.wallet)?;
    let rpc = build_rpc_client(global)?;
    let ctx = ExecutorContext::from_config(rpc, global)?;

    match execute_proposal(&ctx, &identity, index).await {
        Ok(ExecutionResult::Submitted { signature }) => {
            info!(target: "centurion", signature = %signature, "提案执行交易已提交");
            println!("{signature}");
            Ok(())
        }
        Ok(ExecutionResult::Delegated { transaction_base64 }) => {
            info!(
                target: "centurion",
                payload_len = transaction_base64.len(),
                "交易已序列化，请交由外部签名人签名并提交"
            );
            println!("{transaction_base64}");
            Ok(())
        }
        Err(err) => {
            error!(target: "centurion", error = %err, "提案执行失败");
            Err(err.into())
        }
    }
}

async fn run_inspect(config: &CenturionConfig) -> Result<()> {
    let global = &config.global;
    let rpc = build_rpc_client(global)?;
    let ctx = ExecutorContext::from_config(rpc, global)?;

    let resolved = executor::resolve(&ctx.rpc, &ctx.create_key, None).await?;
    let state = &resolved.state;

    println!("multisig: {}", resolved.multisig_pda);
    println!(
        "vault[{}]: {}",
        ctx.vault_index,
        multisig::vault_pda(&resolved.multisig_pda, ctx.vault_index)
    );
    println!("threshold: {}/{}", state.threshold, state.members.len());
    println!("transaction_index: {}", state.transaction_index);
    println!("stale_transaction_index: {}", state.stale_transaction_index);
    println!("time_lock: {}s", state.time_lock);
    for member in &state.members {
        println!("member {} [{}]", member.key, member.permissions.describe());
    }

    Ok(())
}

fn init_configs(args: InitCmd) -> Result<()> {
    let output_dir = match args.output {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    fs::create_dir_all(&output_dir)?;

    let target_path = output_dir.join("centurion.toml");
    if target_path.exists() && !args.force {
        println!(
            "跳过 {}（文件已存在，如需覆盖请加 --force）",
            target_path.display()
        );
        return Ok(());
    }

    fs::write(
        &target_path,
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/centurion.toml")),
    )?;
    println!("已写入 {}", target_path.display());

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn build_rpc_client(global: &GlobalConfig) -> Result<Arc<RpcClient>> {
    let rpc_url = env::var("CENTURION_RPC_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| global.rpc_url.clone());

    let commitment = CommitmentConfig::from_str(&global.commitment)
        .map_err(|err| anyhow!("global.commitment 配置非法: {err}"))?;

    Ok(Arc::new(RpcClient::new_with_commitment(rpc_url, commitment)))
}
