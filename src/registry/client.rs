//! Client records shared by both registries.

use serde::Serialize;

use crate::registry::network::NetworkRange;

/// A named client and its service classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub name: String,
    pub classification: String,
}

impl ClientRecord {
    pub fn new(name: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: classification.into(),
        }
    }
}

/// A client identified by the networks it connects from.
///
/// Networks keep their declaration order, which decides match precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CidrClientRecord {
    #[serde(flatten)]
    pub client: ClientRecord,
    pub networks: Vec<NetworkRange>,
}

impl CidrClientRecord {
    /// Returns `None` when `networks` is empty; such a client can never match.
    pub fn new(client: ClientRecord, networks: Vec<NetworkRange>) -> Option<Self> {
        if networks.is_empty() {
            return None;
        }
        Some(Self { client, networks })
    }
}
