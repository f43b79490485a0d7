//! API key registry.

use std::collections::HashMap;

use crate::registry::client::ClientRecord;

/// Maps opaque API keys to clients.
///
/// Lookups are exact and byte-for-byte: no trimming, no case folding.
/// Comparison is not constant-time.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    clients: HashMap<String, ClientRecord>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. A repeated key replaces the earlier client.
    /// Returns true if an earlier entry was replaced.
    pub fn insert(&mut self, api_key: impl Into<String>, client: ClientRecord) -> bool {
        self.clients.insert(api_key.into(), client).is_some()
    }

    pub fn get(&self, api_key: &str) -> Option<&ClientRecord> {
        self.clients.get(api_key)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// All registered clients, without their keys, sorted by name.
    pub fn clients(&self) -> Vec<&ClientRecord> {
        let mut clients: Vec<_> = self.clients.values().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        clients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let mut registry = KeyRegistry::new();
        registry.insert("12345-ABCDE", ClientRecord::new("ClientA", "premium"));

        assert_eq!(registry.get("12345-ABCDE").unwrap().name, "ClientA");
        assert!(registry.get("12345-abcde").is_none());
        assert!(registry.get(" 12345-ABCDE").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = KeyRegistry::new();
        assert!(!registry.insert("k", ClientRecord::new("First", "standard")));
        assert!(registry.insert("k", ClientRecord::new("Second", "premium")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("k"), Some(&ClientRecord::new("Second", "premium")));
    }
}
