//! Credential resolution.
//!
//! # Data Flow
//! ```text
//! caller (HTTP layer) supplies a credential string
//!     → Resolver loads the current Registries snapshot (lock-free)
//!     → key lookup or CIDR scan
//!     → ClientResult (ResolvedClient | Rejection)
//!
//! On reload:
//!     RegistrySource::load builds a complete snapshot off to the side
//!     → ArcSwap::store publishes it in one step
//!     → in-flight lookups finish on the snapshot they loaded
//! ```

pub mod outcome;

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::registry::{Registries, RegistrySource};

pub use outcome::{ClientResult, CredentialKind, Rejection, ResolvedClient};

impl Registries {
    /// Look up an API key verbatim.
    pub fn resolve_by_key(&self, credential: &str) -> ClientResult {
        self.keys
            .get(credential)
            .map(|record| ResolvedClient::from_record(record, None))
            .ok_or(Rejection::InvalidCredential)
    }

    /// Find the first client whose networks contain `address`.
    pub fn resolve_by_ip(&self, address: &str) -> ClientResult {
        let addr: IpAddr = address.parse().map_err(|_| Rejection::InvalidAddressFormat)?;

        self.networks
            .find(&addr)
            .map(|(record, network)| ResolvedClient::from_record(&record.client, Some(*network)))
            .ok_or(Rejection::NotAuthorized)
    }
}

/// Resolves credentials against an atomically replaceable registry snapshot.
pub struct Resolver {
    current: ArcSwap<Registries>,
    source: Option<RegistrySource>,
    /// Held across read and publish so reloads land in the order they read.
    reload_lock: Mutex<()>,
}

impl Resolver {
    /// Load the registries from `source`. Unreadable sources give empty
    /// registries rather than an error.
    pub fn new(source: RegistrySource) -> Self {
        let registries = source.load();
        record_sizes(&registries);
        Self {
            current: ArcSwap::from_pointee(registries),
            source: Some(source),
            reload_lock: Mutex::new(()),
        }
    }

    /// Serve fixed registries. `reload` keeps the current snapshot.
    pub fn from_registries(registries: Registries) -> Self {
        Self {
            current: ArcSwap::from_pointee(registries),
            source: None,
            reload_lock: Mutex::new(()),
        }
    }

    /// The snapshot visible right now.
    pub fn snapshot(&self) -> Arc<Registries> {
        self.current.load_full()
    }

    /// Replace the whole snapshot in one step.
    pub fn publish(&self, registries: Registries) -> Arc<Registries> {
        let registries = Arc::new(registries);
        record_sizes(&registries);
        self.current.store(registries.clone());
        registries
    }

    /// Re-read the sources and publish the result. Reloads are serialized.
    pub fn reload(&self) -> Arc<Registries> {
        match &self.source {
            Some(source) => {
                let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
                let registries = self.publish(source.load());
                tracing::info!(
                    api_keys = registries.keys.len(),
                    ip_clients = registries.networks.len(),
                    "Client registries reloaded"
                );
                registries
            }
            None => {
                tracing::warn!("Reload requested but registries have no source; keeping current");
                self.snapshot()
            }
        }
    }

    pub fn resolve_by_key(&self, credential: &str) -> ClientResult {
        let result = self.current.load().resolve_by_key(credential);
        metrics::record_resolution("key", outcome_label(&result));
        result
    }

    pub fn resolve_by_ip(&self, address: &str) -> ClientResult {
        let result = self.current.load().resolve_by_ip(address);
        metrics::record_resolution("ip", outcome_label(&result));
        result
    }
}

fn outcome_label(result: &ClientResult) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(rejection) => rejection.label(),
    }
}

fn record_sizes(registries: &Registries) {
    metrics::record_registry_size("keys", registries.keys.len());
    metrics::record_registry_size("ip", registries.networks.len());
}
