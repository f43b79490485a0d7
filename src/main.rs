//! Client identification gate.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 CLIENT GATE                  │
//!                        │                                              │
//!   GET /data            │  ┌──────────┐    ┌──────────────────────┐    │
//!   x-api-key ───────────┼─▶│   http   │───▶│ access_control       │    │
//!                        │  │  server  │    │ key / client address │    │
//!   GET /ip-data         │  └──────────┘    └──────────┬───────────┘    │
//!   X-Forwarded-For ─────┼─▶                           │                │
//!                        │                             ▼                │
//!                        │                   ┌───────────────────┐      │
//!                        │                   │     resolver      │      │
//!                        │                   │ ArcSwap snapshot  │      │
//!                        │                   └─────────▲─────────┘      │
//!                        │                             │ atomic swap    │
//!                        │  ┌──────────┐    ┌──────────┴───────────┐    │
//!   clients.csv ─────────┼─▶│ watcher  │───▶│ reload task          │    │
//!   ip_clients.csv       │  │ SIGHUP   │    │ registry::loader     │    │
//!                        │  │ admin    │    └──────────────────────┘    │
//!                        │  └──────────┘                                │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use client_gate::config::{load_config, GateConfig};
use client_gate::lifecycle::startup;
use client_gate::observability::logging;

#[derive(Parser)]
#[command(name = "client-gate", version)]
#[command(about = "Identify API clients by key or source address", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    let _log_guard = logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "client-gate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        keys_path = %config.sources.keys_path,
        ip_path = %config.sources.ip_path,
        watch = config.sources.watch,
        admin = config.admin.enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
