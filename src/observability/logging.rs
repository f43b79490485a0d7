//! Structured logging setup.
//!
//! Console output always; optionally a daily-rotated file as well, written
//! from a background thread.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "CLIENT_GATE_LOG";

/// Build the log filter: `CLIENT_GATE_LOG` wins, then the configured level.
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Daily-rotated appender for `path`, keeping `retention` files.
/// Rotated files are named `<file name>.<date>`.
pub fn file_appender(path: &Path, retention: usize) -> Result<RollingFileAppender, InitError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "client-gate.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(retention)
        .build(dir)
}

/// Install the global subscriber. Later calls are ignored.
///
/// The returned guard flushes the log file when dropped; hold it for the
/// life of the process.
pub fn init_logging(config: &ObservabilityConfig) -> Option<WorkerGuard> {
    let mut file_error = None;
    let (file_layer, guard) = match config.log_file.as_deref().map(Path::new) {
        Some(path) => match file_appender(path, config.log_retention) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
            }
            Err(e) => {
                file_error = Some(e);
                (None, None)
            }
        },
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    if let Some(e) = file_error {
        tracing::error!(log_file = ?config.log_file, error = %e, "Log file unavailable; logging to console only");
    }

    guard
}
