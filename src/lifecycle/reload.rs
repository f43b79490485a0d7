//! Registry reload task.
//!
//! # Responsibilities
//! - Receive reload triggers (file watcher, SIGHUP)
//! - Collapse bursts of file events into one reload
//! - Run the blocking file read off the async workers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;
use crate::registry::Registries;
use crate::resolver::Resolver;

/// What asked for a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    FileChange,
    Signal,
    Admin,
}

impl ReloadTrigger {
    pub fn label(&self) -> &'static str {
        match self {
            ReloadTrigger::FileChange => "file_change",
            ReloadTrigger::Signal => "signal",
            ReloadTrigger::Admin => "admin",
        }
    }
}

/// Reload on a blocking thread and publish the new snapshot.
pub async fn reload_now(resolver: &Arc<Resolver>, trigger: ReloadTrigger) -> Option<Arc<Registries>> {
    let resolver = resolver.clone();
    match tokio::task::spawn_blocking(move || resolver.reload()).await {
        Ok(registries) => {
            metrics::record_reload(trigger.label());
            Some(registries)
        }
        Err(e) => {
            tracing::error!(trigger = trigger.label(), error = %e, "Registry reload task failed");
            None
        }
    }
}

/// Drive reloads until shutdown or until every trigger sender is dropped.
pub async fn run_reload_loop(
    resolver: Arc<Resolver>,
    mut triggers: mpsc::UnboundedReceiver<ReloadTrigger>,
    debounce: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let trigger = tokio::select! {
            trigger = triggers.recv() => match trigger {
                Some(trigger) => trigger,
                None => break,
            },
            _ = shutdown.recv() => {
                tracing::info!("Reload task received shutdown signal, exiting loop");
                break;
            }
        };

        // Editors often write a file in several steps; wait for it to settle.
        if trigger == ReloadTrigger::FileChange && !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        while triggers.try_recv().is_ok() {}

        tracing::debug!(trigger = trigger.label(), "Reloading client registries");
        reload_now(&resolver, trigger).await;
    }
}
