//! Mint submitter - sends one contract `mint` call and reports its receipt
//!
//! Loads settings and the contract ABI, connects to the configured RPC node,
//! signs a single transaction with the configured wallet and waits (bounded)
//! for it to be confirmed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};

mod chain;
mod config;
mod contract;
mod error;
mod tx;

use chain::ChainProvider;
use config::Settings;
use contract::ContractReference;
use error::{MintError, Rejection};
use tx::{MintSubmitter, Outcome};

/// Exit code when interrupted while waiting
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// TOML settings file; `${VAR}` references are filled from the environment.
    #[arg(long, env = "MINT_CONFIG", default_value = "config/default.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be populated
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("Starting mint submitter v{}", env!("CARGO_PKG_VERSION"));

    tokio::select! {
        result = run(&cli) => match result.and_then(|o| o.into_result().map_err(Into::into)) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Error: {:#}", e);
                if let Some(Rejection::NonceConflict) =
                    e.downcast_ref::<MintError>().and_then(MintError::rejection)
                {
                    warn!("Another transaction from this wallet may still be pending");
                }
                ExitCode::from(exit_code(&e))
            }
        },
        _ = shutdown_signal() => {
            warn!("Interrupted; a broadcast transaction may still be mined");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: &Cli) -> Result<Outcome> {
    // Load configuration
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Loading settings from {:?}", cli.config))?;

    let contract = ContractReference::load(&settings.contract)?;

    let provider = ChainProvider::connect(&settings.network).await?;

    let submitter = MintSubmitter::new(provider, &settings.submission)
        .with_function(settings.contract.function.clone());

    let outcome = submitter
        .submit_mint(settings.wallet.private_key.expose(), &contract)
        .await?;

    Ok(outcome)
}

/// Exit code of the underlying `MintError`, or 1
fn exit_code(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<MintError>()
        .map(MintError::exit_code)
        .unwrap_or(1)
}

fn init_logging(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mint_submitter=debug,hyper=warn,reqwest=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
