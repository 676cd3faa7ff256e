//! Covault daemon — entry point for serving the authorization engine.

mod config;

use anyhow::Context;
use clap::Parser;
use config::DaemonConfig;
use covault_engine::{NullExecutor, OwnerRoster};
use covault_nullables::NullStore;
use covault_rpc::{RpcServer, VaultState, VaultStore};
use covault_store_lmdb::{LmdbEnvironment, LmdbLogStore};
use covault_types::Address;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "covault-daemon", about = "Covault authorization engine daemon")]
struct Cli {
    /// Owner addresses (comma-separated, 0x-prefixed). Only consulted on
    /// first boot; thereafter the stored roster is authoritative.
    #[arg(long, env = "COVAULT_OWNERS", value_delimiter = ',')]
    owners: Vec<String>,

    /// Approvals (or rejections) required to finalize a transaction.
    #[arg(long, env = "COVAULT_REQUIRED_APPROVALS")]
    required_approvals: Option<usize>,

    /// Data directory for the transaction log.
    #[arg(long, env = "COVAULT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// RPC server port.
    #[arg(long, env = "COVAULT_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Keep all state in memory, nothing on disk.
    #[arg(long, env = "COVAULT_EPHEMERAL")]
    ephemeral: bool,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the daemon.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    covault_utils::init_tracing();

    let cli = Cli::parse();

    let file_config: DaemonConfig = if let Some(ref config_path) = cli.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("read config file {}", config_path.display()))?;
        let cfg = toml::from_str(&contents)
            .with_context(|| format!("parse config file {}", config_path.display()))?;
        tracing::info!("Loaded config from {}", config_path.display());
        cfg
    } else {
        DaemonConfig::default()
    };

    let config = DaemonConfig {
        owners: if cli.owners.is_empty() {
            file_config.owners
        } else {
            cli.owners
        },
        required_approvals: cli
            .required_approvals
            .unwrap_or(file_config.required_approvals),
        data_dir: cli.data_dir.unwrap_or(file_config.data_dir),
        rpc_port: cli.rpc_port.unwrap_or(file_config.rpc_port),
        ephemeral: cli.ephemeral || file_config.ephemeral,
    };

    match cli.command {
        Command::Run => run(config).await,
    }
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    let roster = configured_roster(&config)?;

    let store: Box<dyn VaultStore> = if config.ephemeral {
        tracing::info!("running ephemeral, state will not survive restart");
        Box::new(NullStore::new())
    } else {
        let env = LmdbEnvironment::open(&config.data_dir, covault_store_lmdb::environment::DEFAULT_MAP_SIZE)
            .with_context(|| format!("open LMDB environment at {}", config.data_dir.display()))?;
        Box::new(LmdbLogStore::new(Arc::new(env)))
    };

    let state = VaultState::open(roster, store, Box::new(NullExecutor))
        .context("open vault state")?;

    tracing::info!("Starting covault daemon (RPC:{})", config.rpc_port);
    let server = RpcServer::new(config.rpc_port, Arc::new(state));
    server.start().await.context("RPC server")?;

    tracing::info!("covault daemon exited cleanly");
    Ok(())
}

/// Build the configured roster, if the config carries one at all.
///
/// An empty owner list means "rely on the stored roster"; a non-empty list
/// must be a valid roster on its own.
fn configured_roster(config: &DaemonConfig) -> anyhow::Result<Option<OwnerRoster>> {
    if config.owners.is_empty() {
        return Ok(None);
    }

    let mut owners = Vec::with_capacity(config.owners.len());
    for raw in &config.owners {
        let address = Address::parse(raw)
            .with_context(|| format!("malformed owner address: {raw}"))?;
        owners.push(address);
    }
    let roster = OwnerRoster::new(owners, config.required_approvals)?;
    Ok(Some(roster))
}
