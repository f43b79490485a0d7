//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Load registries → Spawn reload task → Start listeners
//!
//! Reload (reload.rs):
//!     File change / SIGHUP → debounce → Resolver::reload
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → listeners drain → reload task exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then registries, then listeners
//! - A reload never blocks a lookup; the new snapshot is swapped in whole

pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use reload::ReloadTrigger;
pub use shutdown::Shutdown;
