//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the client registries
//! - Start background tasks (source watcher, reload loop, metrics)
//! - Bind listeners and begin accepting traffic
//! - Drain everything on shutdown
//!
//! # Design Decisions
//! - Fail fast: a listener that cannot bind is fatal
//! - A missing registry source is not fatal; it denies every credential
//! - Listeners start last (traffic only when registries are loaded)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::{run_admin_server, AdminState};
use crate::config::watcher::SourceWatcher;
use crate::config::GateConfig;
use crate::http::HttpServer;
use crate::lifecycle::reload::run_reload_loop;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::registry::RegistrySource;
use crate::resolver::Resolver;

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("signal handler error: {0}")]
    Signal(std::io::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

/// Run the gate until a shutdown signal arrives.
pub async fn run(config: GateConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let source = RegistrySource::from(&config.sources);
    let resolver = Arc::new(Resolver::new(source.clone()));
    let shutdown = Shutdown::new();

    // Reload triggers: file watcher and SIGHUP.
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    let _watcher = if config.sources.watch {
        match SourceWatcher::new(&source, reload_tx.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Registry source watcher unavailable; reload via SIGHUP or admin API");
                None
            }
        }
    } else {
        None
    };
    signals::spawn_hangup_reload(reload_tx).map_err(StartupError::Signal)?;

    let reload_task = tokio::spawn(run_reload_loop(
        resolver.clone(),
        reload_rx,
        Duration::from_millis(config.sources.watch_debounce_ms),
        shutdown.subscribe(),
    ));

    let admin_task = if config.admin.enabled {
        let listener = bind(&config.admin.bind_address).await?;
        let state = AdminState {
            resolver: resolver.clone(),
            api_key: Arc::from(config.admin.api_key.as_str()),
        };
        Some(tokio::spawn(run_admin_server(listener, state, shutdown.subscribe())))
    } else {
        None
    };

    let listener = bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, resolver);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let early_exit = tokio::select! {
        _ = signals::shutdown_signal() => None,
        result = &mut server_task => Some(result),
    };

    shutdown.trigger();

    let server_result = match early_exit {
        Some(result) => {
            tracing::error!("HTTP server exited before shutdown was requested");
            flatten(result)
        }
        None => flatten(server_task.await),
    };
    if let Some(task) = admin_task {
        if let Err(e) = flatten(task.await) {
            tracing::error!(error = %e, "Admin API stopped with an error");
        }
    }
    let _ = reload_task.await;

    server_result.map_err(StartupError::Server)
}

fn flatten(result: Result<Result<(), std::io::Error>, tokio::task::JoinError>) -> Result<(), std::io::Error> {
    result.map_err(std::io::Error::other)?
}
