//! OS signal handling.
//!
//! - SIGINT / SIGTERM → graceful shutdown
//! - SIGHUP → registry reload (unix only)

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::reload::ReloadTrigger;

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}

/// Forward SIGHUP to the reload task.
#[cfg(unix)]
pub fn spawn_hangup_reload(reload_tx: mpsc::UnboundedSender<ReloadTrigger>) -> std::io::Result<JoinHandle<()>> {
    let mut hangup = signal::unix::signal(signal::unix::SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received, reloading client registries");
            if reload_tx.send(ReloadTrigger::Signal).is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_hangup_reload(_reload_tx: mpsc::UnboundedSender<ReloadTrigger>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}
