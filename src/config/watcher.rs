//! Registry source watcher for hot reload.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::lifecycle::reload::ReloadTrigger;
use crate::registry::RegistrySource;

/// Watches the registry CSV files and requests a reload when they change.
///
/// Parent directories are watched instead of the files themselves so that
/// editors which save by rename keep being observed.
pub struct SourceWatcher {
    files: Vec<PathBuf>,
    reload_tx: mpsc::UnboundedSender<ReloadTrigger>,
}

impl SourceWatcher {
    pub fn new(source: &RegistrySource, reload_tx: mpsc::UnboundedSender<ReloadTrigger>) -> Self {
        Self {
            files: vec![absolute(&source.keys_path), absolute(&source.ip_path)],
            reload_tx,
        }
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.reload_tx.clone();
        let files = self.files.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
                    if relevant && event.paths.iter().any(|p| is_watched(p, &files)) {
                        tracing::info!(paths = ?event.paths, "Client registry source changed");
                        let _ = tx.send(ReloadTrigger::FileChange);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default(),
        )?;

        let dirs: BTreeSet<PathBuf> = self
            .files
            .iter()
            .filter_map(|f| f.parent().map(Path::to_path_buf))
            .collect();
        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(files = ?self.files, "Registry source watcher started");
        Ok(watcher)
    }
}

/// Absolute path with a canonical parent directory, when it exists.
fn absolute(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent.canonicalize().unwrap_or(parent);
    match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    }
}

fn is_watched(path: &Path, files: &[PathBuf]) -> bool {
    let path = absolute(path);
    files.iter().any(|f| *f == path)
}
