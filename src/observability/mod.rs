//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - API keys never appear in logs or metric labels
//! - Request ID flows from the HTTP layer into every request log line
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
