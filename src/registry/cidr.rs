//! CIDR client registry and address matcher.
//!
//! # Responsibilities
//! - Hold IP-identified clients in declaration order
//! - Find the first client whose networks contain an address
//!
//! # Design Decisions
//! - Linear first-match scan, not longest-prefix: earlier clients win
//!   overlaps, and within a client earlier networks win
//! - Registries are small and read-only; no index structure is kept

use std::net::IpAddr;

use crate::registry::client::CidrClientRecord;
use crate::registry::network::NetworkRange;

/// Ordered list of IP-identified clients.
#[derive(Debug, Clone, Default)]
pub struct CidrRegistry {
    clients: Vec<CidrClientRecord>,
}

impl CidrRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a client after all previously added ones.
    pub fn push(&mut self, record: CidrClientRecord) {
        self.clients.push(record);
    }

    /// First client (and the network of that client) containing `addr`.
    pub fn find(&self, addr: &IpAddr) -> Option<(&CidrClientRecord, &NetworkRange)> {
        self.clients.iter().find_map(|record| {
            record
                .networks
                .iter()
                .find(|network| network.contains(addr))
                .map(|network| (record, network))
        })
    }

    pub fn clients(&self) -> &[CidrClientRecord] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl FromIterator<CidrClientRecord> for CidrRegistry {
    fn from_iter<I: IntoIterator<Item = CidrClientRecord>>(iter: I) -> Self {
        Self {
            clients: iter.into_iter().collect(),
        }
    }
}
