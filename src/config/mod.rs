//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gate.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!
//! Registry sources (CSV) are watched separately:
//!     watcher.rs detects change
//!     → reload task rebuilds the registries
//!     → atomic swap of the snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the registries hot-reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, ClientIpConfig, GateConfig, ListenerConfig, ObservabilityConfig, SourcesConfig, TimeoutConfig};
