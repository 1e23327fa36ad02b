//! Arena Server
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────┐
//!                 │                     ARENA SERVER                      │
//!                 │                                                       │
//!   settings ─────┼─▶ config ──▶ lifecycle::Server ──▶ net::listener      │
//!   (TOML)        │   validate    state machine         accept loop       │
//!                 │                    │                     │            │
//!                 │                    ▼                     ▼            │
//!                 │             SubsystemNotifier    http upgrade (/ws)   │
//!                 │       sessions → rooms → actions → storage            │
//!                 │                                                       │
//!   stdin ────────┼─▶ console (pause / resume / shutdown)                 │
//!   Ctrl-C ───────┼─▶ shutdown                                            │
//!                 └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use arena_server::config::{load_settings, ServerSettings};
use arena_server::observability::{logging, metrics};
use arena_server::Server;

#[derive(Parser)]
#[command(name = "arena-server")]
#[command(version, about = "Multiplayer game server", long_about = None)]
struct Cli {
    /// Settings file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read administrative commands from stdin.
    #[arg(long)]
    console: bool,

    /// Log level when RUST_LOG is not set. Overrides the settings file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Some(load_settings(path)?),
        None => None,
    };
    if cli.console {
        settings.get_or_insert_with(ServerSettings::default).admin.console = true;
    }

    let observability = settings
        .as_ref()
        .map(|s| s.observability.clone())
        .unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&observability.log_level);
    logging::init_logging(level)?;

    tracing::info!(version = arena_server::VERSION, "arena-server starting");

    if observability.metrics_enabled {
        match observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = Server::new();

    let interrupted = server.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                if let Err(e) = interrupted.shut_down().await {
                    tracing::error!(error = %e, "Shutdown finished with error");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt"),
        }
    });

    server.start(settings).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
