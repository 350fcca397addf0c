use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{init_tracing, load_config_from, Config};
use core_types::Timestamp;
use engine::{initialise, load_or_bootstrap, AutoRebalancer, Clock, ProtocolState, SystemClock};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use storage::SnapshotStore;
use tracing::info;

/// The main entry point for the AutoFi protocol service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; overrides may come from the real environment.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    // Dropping the guard flushes the file writer, so it lives as long as main.
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(&config, args).await,
        Commands::Init(args) => handle_init(&config, args).await,
        Commands::Status => handle_status(&config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A yield-optimisation vault with managed strategies and scheduled rebalancing.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. The extension may be omitted.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and the auto-rebalance loop.
    Serve(ServeArgs),
    /// Deploy a fresh protocol state from configuration and persist it.
    Init(InitArgs),
    /// Print vault, strategy and rebalance status.
    Status,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`/`server.port` (e.g. "0.0.0.0:8080").
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct InitArgs {
    /// Replace an existing snapshot.
    #[arg(long)]
    force: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(config: &Config, args: ServeArgs) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (engine, startup) = load_or_bootstrap(config, clock).await?;
    info!(?startup, "engine ready");
    let engine = Arc::new(engine);

    let interval = config.rebalance.auto_interval_secs;
    if interval > 0 {
        let rebalancer = AutoRebalancer::new(engine.clone(), Duration::from_secs(interval));
        tokio::spawn(rebalancer.start());
    } else {
        info!("auto rebalance loop disabled");
    }

    let addr = match args.addr {
        Some(addr) => addr,
        None => config
            .server
            .bind_address()
            .parse()
            .with_context(|| format!("invalid server address {}", config.server.bind_address()))?,
    };
    web_server::run_server(engine, addr).await
}

async fn handle_init(config: &Config, args: InitArgs) -> anyhow::Result<()> {
    let state = initialise(config, &SystemClock, args.force).await?;
    println!(
        "Initialised vault {} owned by {} with {} strategies ({} bps allocated).",
        state.vault.address(),
        state.vault.owner(),
        state.strategy_manager.all_strategies().len(),
        state.strategy_manager.total_allocation(),
    );
    Ok(())
}

async fn handle_status(config: &Config) -> anyhow::Result<()> {
    let now = SystemClock.now();
    let state = match &config.storage.snapshot_path {
        Some(path) => match SnapshotStore::new(path.clone()).load::<ProtocolState>().await? {
            Some(snapshot) => {
                println!("State from {} (saved {})", path.display(), snapshot.saved_at);
                snapshot.state
            }
            None => bootstrap_preview(config, now)?,
        },
        None => bootstrap_preview(config, now)?,
    };

    print_vault(&state);
    print_strategies(&state);
    print_rebalance(&state, now);
    Ok(())
}

/// The state `init` would produce, without writing it anywhere.
fn bootstrap_preview(config: &Config, now: Timestamp) -> anyhow::Result<ProtocolState> {
    println!("No snapshot found; showing the configured initial state.");
    let (state, _) = ProtocolState::bootstrap(config, now)?;
    Ok(state)
}

fn print_vault(state: &ProtocolState) {
    let info = state.vault.vault_info();
    let mut table = Table::new();
    table.set_header(vec!["Vault", "Value"]);
    table.add_row(vec!["Address".to_string(), info.address.to_string()]);
    table.add_row(vec!["Owner".to_string(), info.owner.to_string()]);
    table.add_row(vec!["Total assets".to_string(), info.total_assets.to_string()]);
    table.add_row(vec!["Total shares".to_string(), info.total_shares.to_string()]);
    table.add_row(vec!["Custody held".to_string(), state.custody_held.to_string()]);
    table.add_row(vec!["Depositors".to_string(), info.depositors.to_string()]);
    table.add_row(vec!["Min deposit".to_string(), info.min_deposit.to_string()]);
    table.add_row(vec!["Lock period (s)".to_string(), info.lock_period.to_string()]);
    table.add_row(vec!["Paused".to_string(), info.paused.to_string()]);
    println!("{table}");
}

fn print_strategies(state: &ProtocolState) {
    let manager = &state.strategy_manager;
    let mut table = Table::new();
    table.set_header(vec![
        "Strategy", "Name", "Active", "Allocation", "Max", "APY (bps)", "Score", "Deposited",
    ]);
    for record in manager.all_strategies() {
        table.add_row(vec![
            record.strategy_address.to_string(),
            record.name.clone(),
            record.is_active.to_string(),
            record.allocation.to_string(),
            record.max_allocation.to_string(),
            record.apy.to_string(),
            record.performance_score.to_string(),
            record.total_deposited.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "Total allocation: {} bps across {} active strategies",
        manager.total_allocation(),
        manager.active_strategy_count()
    );
}

fn print_rebalance(state: &ProtocolState, now: Timestamp) {
    let executor = &state.rebalance_executor;
    let status = executor.can_execute_rebalance(now);
    let config = executor.config();

    let mut table = Table::new();
    table.set_header(vec!["Rebalance", "Value"]);
    table.add_row(vec!["Threshold (bps)".to_string(), config.rebalance_threshold.to_string()]);
    table.add_row(vec!["Max amount".to_string(), config.max_rebalance_amount.to_string()]);
    table.add_row(vec!["Cooldown (s)".to_string(), config.cooldown_period.to_string()]);
    table.add_row(vec!["Auto enabled".to_string(), config.auto_rebalance_enabled.to_string()]);
    table.add_row(vec!["Rebalances".to_string(), executor.rebalance_count().to_string()]);
    table.add_row(vec!["Last rebalance".to_string(), format_time(executor.last_rebalance_time())]);
    table.add_row(vec!["Can execute".to_string(), status.can_execute.to_string()]);
    table.add_row(vec!["Time remaining (s)".to_string(), status.time_remaining.to_string()]);
    table.add_row(vec!["Paused".to_string(), executor.is_paused().to_string()]);
    println!("{table}");
}

fn format_time(ts: Option<Timestamp>) -> String {
    let Some(ts) = ts else {
        return "never".to_string();
    };
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
