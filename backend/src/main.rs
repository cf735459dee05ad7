use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use shared::{CommandOutcome, SnapshotRecord};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use debt_tracker::config::{default_config_path, LedgerConfig};
use debt_tracker::domain::display::{format_amount, format_date, notification_message};
use debt_tracker::domain::{parse_amount, CounterAnimator, LedgerError, LedgerService, SystemClock};
use debt_tracker::storage::{DbConnection, KeyValueStore, LedgerRepository, MemoryStore};
use debt_tracker::{create_router, initialize_backend};

#[derive(Parser)]
#[command(name = "debt-tracker", version, about = "Track a debt that accrues daily interest", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite URL, overrides the config file
    #[arg(long, global = true)]
    database: Option<String>,

    /// Keep the ledger in memory only; nothing is read or written on disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve,
    /// Show the current balance and pending interest
    Status,
    /// List the undo history, most recent first
    History,
    /// Record a payment
    Pay {
        /// Whole amount, e.g. 5000 or 1,250
        amount: String,
    },
    /// Record a borrow
    Borrow {
        /// Whole amount, e.g. 5000 or 1,250
        amount: String,
    },
    /// Revert the most recent payment or borrow
    Undo,
    /// Write a config file with the default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().or_else(default_config_path);

    if let Commands::InitConfig { force } = cli.command {
        let path = config_path.ok_or_else(|| anyhow!("no config directory on this platform, pass --config"))?;
        return init_config(&path, force);
    }

    let mut config = match &config_path {
        Some(path) => LedgerConfig::load_or_default(path)?,
        None => LedgerConfig::default(),
    };
    if let Some(url) = cli.database.clone() {
        config.database_url = Some(url);
    }

    let store = open_store(&config, cli.ephemeral).await?;

    match cli.command {
        Commands::Serve => {
            serve(&config, store).await?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let repository = LedgerRepository::new(store);
            let mut ledger = LedgerService::load(repository, &config, Arc::new(SystemClock))
                .await
                .context("failed to load the ledger")?;
            run_command(command, &mut ledger, config.animation_duration()).await
        }
    }
}

async fn open_store(config: &LedgerConfig, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let url = config.database_url()?;
    info!("Opening ledger database {}", url);
    let db = DbConnection::new(&url)
        .await
        .with_context(|| format!("failed to open database {}", url))?;
    Ok(Arc::new(db))
}

fn init_config(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        eprintln!("{} already exists, use --force to overwrite", path.display());
        return Ok(ExitCode::FAILURE);
    }
    LedgerConfig::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn serve(config: &LedgerConfig, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let app_state = initialize_backend(config, store, Arc::new(SystemClock)).await?;
    let app = create_router(app_state, &config.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn run_command(command: Commands, ledger: &mut LedgerService, animation: Duration) -> Result<ExitCode> {
    let result = match command {
        Commands::Status => {
            print_status(ledger);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::History => {
            print_history(&ledger.history());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Pay { amount } => match parse_amount(&amount) {
            Ok(amount) => ledger.record_payment(amount as f64).await,
            Err(e) => Err(e),
        },
        Commands::Borrow { amount } => match parse_amount(&amount) {
            Ok(amount) => ledger.record_borrow(amount as f64).await,
            Err(e) => Err(e),
        },
        Commands::Undo => ledger.undo().await,
        Commands::Serve | Commands::InitConfig { .. } => {
            return Err(anyhow!("command is not a ledger command"));
        }
    };

    match result {
        Ok(outcome) => {
            render_outcome(&outcome, animation).await;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            debug!("Command rejected: {}", e);
            print_rejection(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_rejection(error: &LedgerError) {
    match notification_message(&error.to_event()) {
        Some(message) => eprintln!("{}", message),
        None => eprintln!("{}", error),
    }
}

async fn render_outcome(outcome: &CommandOutcome, animation: Duration) {
    for event in &outcome.events {
        if let Some(message) = notification_message(event) {
            println!("{}", message);
        }
    }

    match outcome.balance_transition() {
        Some((from, to)) => animate_balance(from, to, animation).await,
        None => println!("Balance: {}", outcome.ledger.display_balance),
    }
}

/// Count the balance from `from` to `to` on a single terminal line
async fn animate_balance(from: f64, to: f64, duration: Duration) {
    if !io::stdout().is_terminal() || duration.is_zero() {
        println!("Balance: {}", format_amount(to));
        return;
    }

    let mut animator = CounterAnimator::new(from, duration);
    let mut frames = animator.subscribe();
    let printer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while frames.changed().await.is_ok() {
            let value = *frames.borrow_and_update();
            let _ = write!(stdout, "\rBalance: {:<20}", format_amount(value as f64));
            let _ = stdout.flush();
        }
    });

    animator.animate(from, to);
    animator.wait().await;
    // Closing the channel lets the printer drain the last frame and exit
    drop(animator);
    if let Err(e) = printer.await {
        debug!("Balance printer ended abnormally: {}", e);
    }
    println!();
}

fn print_status(ledger: &LedgerService) {
    let view = ledger.view();
    println!("Balance:       {}", view.display_balance);
    println!("Last accrual:  {}", view.last_accrual_date);
    if view.pending_days > 0 {
        println!(
            "Pending:       {} in interest for {} day{} (charged on the next transaction)",
            format_amount(view.pending_interest),
            view.pending_days,
            if view.pending_days == 1 { "" } else { "s" }
        );
    }
    println!("Undo steps:    {}", view.history_len);
}

fn print_history(records: &[SnapshotRecord]) {
    if records.is_empty() {
        println!("No history.");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        println!("{:>2}. {:>16}  {}", i + 1, format_amount(record.debt), format_date(record.date));
    }
}
