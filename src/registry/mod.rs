//! Client registries.
//!
//! # Data Flow
//! ```text
//! CSV sources
//!     → loader.rs (header contract, per-row / per-network validation)
//!     → keys.rs  (KeyRegistry: api key → client)
//!     → cidr.rs  (CidrRegistry: ordered clients with networks)
//!     → Registries snapshot (immutable, shared via Arc)
//! ```

pub mod cidr;
pub mod client;
pub mod keys;
pub mod loader;
pub mod network;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub use cidr::CidrRegistry;
pub use client::{CidrClientRecord, ClientRecord};
pub use keys::KeyRegistry;
pub use loader::LoadError;
pub use network::{NetworkParseError, NetworkRange};

use crate::config::SourcesConfig;

/// Where the registries are read from.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    pub keys_path: PathBuf,
    pub ip_path: PathBuf,
}

impl RegistrySource {
    pub fn new(keys_path: impl Into<PathBuf>, ip_path: impl Into<PathBuf>) -> Self {
        Self {
            keys_path: keys_path.into(),
            ip_path: ip_path.into(),
        }
    }

    /// Build a complete snapshot. Never fails; unreadable sources yield
    /// empty registries.
    pub fn load(&self) -> Registries {
        Registries::new(
            loader::load_key_registry(&self.keys_path),
            loader::load_cidr_registry(&self.ip_path),
        )
    }
}

impl From<&SourcesConfig> for RegistrySource {
    fn from(config: &SourcesConfig) -> Self {
        Self::new(&config.keys_path, &config.ip_path)
    }
}

/// One immutable view of both registries.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub keys: KeyRegistry,
    pub networks: CidrRegistry,
    /// Seconds since the Unix epoch when this snapshot was built.
    pub loaded_at: u64,
}

impl Registries {
    pub fn new(keys: KeyRegistry, networks: CidrRegistry) -> Self {
        let loaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            keys,
            networks,
            loaded_at,
        }
    }
}
