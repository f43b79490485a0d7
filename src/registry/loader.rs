//! Registry loading from CSV sources.
//!
//! # Data Flow
//! ```text
//! clients.csv    (api_key,client_name,classification)
//!     → read_key_registry  → KeyRegistry
//! ip_clients.csv (client_name,classification,cidr_ranges)
//!     → read_cidr_registry → CidrRegistry
//! ```
//!
//! # Design Decisions
//! - Header contract is checked once; extra columns are ignored
//! - Key rows are taken whole; short rows read missing cells as ""
//! - CIDR cells are validated per network; bad networks are skipped,
//!   rows left without networks are dropped
//! - `load_*` never fail: errors are logged and an empty registry is
//!   returned, which rejects every credential

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use crate::registry::cidr::CidrRegistry;
use crate::registry::client::{CidrClientRecord, ClientRecord};
use crate::registry::keys::KeyRegistry;
use crate::registry::network::NetworkRange;

pub const KEY_COLUMNS: [&str; 3] = ["api_key", "client_name", "classification"];
pub const CIDR_COLUMNS: [&str; 3] = ["client_name", "classification", "cidr_ranges"];

/// Errors that prevent a source from being read at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

/// Column positions for a fixed set of required names.
struct Columns<const N: usize>([usize; N]);

impl<const N: usize> Columns<N> {
    /// Locate each required column. Duplicate headers resolve to the last one.
    fn locate(headers: &StringRecord, required: [&'static str; N]) -> Result<Self, LoadError> {
        let mut positions = [0usize; N];
        let mut missing = Vec::new();

        for (slot, name) in positions.iter_mut().zip(required) {
            let position = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == name)
                .map(|(i, _)| i)
                .last();
            match position {
                Some(pos) => *slot = pos,
                None => missing.push(name),
            }
        }

        if missing.is_empty() {
            Ok(Self(positions))
        } else {
            Err(LoadError::MissingColumns(missing))
        }
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        record.get(self.0[column]).unwrap_or("")
    }
}

fn csv_reader<R: io::Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(source)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an API key source.
pub fn read_key_registry<R: io::Read>(source: R) -> Result<KeyRegistry, LoadError> {
    let mut reader = csv_reader(source);
    let columns = Columns::locate(reader.headers()?, KEY_COLUMNS)?;
    let mut registry = KeyRegistry::new();

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Skipping unreadable key row");
                continue;
            }
        };

        let client = ClientRecord::new(columns.cell(&record, 1), columns.cell(&record, 2));
        if registry.insert(columns.cell(&record, 0), client) {
            tracing::debug!(row = index + 1, "Duplicate API key replaced an earlier entry");
        }
    }

    Ok(registry)
}

/// Parse an IP client source.
pub fn read_cidr_registry<R: io::Read>(source: R) -> Result<CidrRegistry, LoadError> {
    let mut reader = csv_reader(source);
    let columns = Columns::locate(reader.headers()?, CIDR_COLUMNS)?;
    let mut registry = CidrRegistry::new();

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Skipping unreadable IP client row");
                continue;
            }
        };

        let name = columns.cell(&record, 0);
        let networks = parse_networks(name, columns.cell(&record, 2));
        let client = ClientRecord::new(name, columns.cell(&record, 1));

        match CidrClientRecord::new(client, networks) {
            Some(entry) => registry.push(entry),
            None => tracing::warn!(client = %name, "Client has no valid CIDR ranges; dropped"),
        }
    }

    Ok(registry)
}

/// Parse a comma-separated CIDR cell, skipping entries that do not parse.
fn parse_networks(client: &str, cell: &str) -> Vec<NetworkRange> {
    cell.split(',')
        .map(str::trim)
        .filter_map(|literal| match literal.parse::<NetworkRange>() {
            Ok(network) => Some(network),
            Err(e) => {
                tracing::warn!(client = %client, cidr = %literal, error = %e, "Invalid CIDR range skipped");
                None
            }
        })
        .collect()
}

/// Read the key source at `path`.
pub fn try_load_key_registry(path: &Path) -> Result<KeyRegistry, LoadError> {
    read_key_registry(open(path)?)
}

/// Read the IP client source at `path`.
pub fn try_load_cidr_registry(path: &Path) -> Result<CidrRegistry, LoadError> {
    read_cidr_registry(open(path)?)
}

/// Read the key source, degrading to an empty registry on failure.
pub fn load_key_registry(path: &Path) -> KeyRegistry {
    match try_load_key_registry(path) {
        Ok(registry) => {
            tracing::info!(path = %path.display(), clients = registry.len(), "Key registry loaded");
            registry
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Key registry unavailable; API key validation will fail");
            KeyRegistry::new()
        }
    }
}

/// Read the IP client source, degrading to an empty registry on failure.
pub fn load_cidr_registry(path: &Path) -> CidrRegistry {
    match try_load_cidr_registry(path) {
        Ok(registry) => {
            tracing::info!(path = %path.display(), clients = registry.len(), "IP client registry loaded");
            registry
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "IP client registry unavailable; IP validation will fail");
            CidrRegistry::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_key_rows() {
        let csv = "api_key,client_name,classification\n\
                   12345-ABCDE,ClientA,premium\n\
                   98765-ZYXWV,ClientB,standard\n";
        let registry = read_key_registry(csv.as_bytes()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("12345-ABCDE"), Some(&ClientRecord::new("ClientA", "premium")));
        assert_eq!(registry.get("98765-ZYXWV"), Some(&ClientRecord::new("ClientB", "standard")));
    }

    #[test]
    fn test_key_columns_in_any_order_with_extras() {
        let csv = "notes,classification,client_name,api_key\n\
                   vip,premium,ClientA,k1\n";
        let registry = read_key_registry(csv.as_bytes()).unwrap();
        assert_eq!(registry.get("k1"), Some(&ClientRecord::new("ClientA", "premium")));
    }

    #[test]
    fn test_missing_key_columns() {
        let csv = "api_key,name,classification\nk1,ClientA,premium\n";
        match read_key_registry(csv.as_bytes()) {
            Err(LoadError::MissingColumns(missing)) => assert_eq!(missing, vec!["client_name"]),
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_header_uses_last_column() {
        let csv = "api_key,client_name,classification,client_name\n\
                   k1,Ignored,premium,ClientA\n";
        let registry = read_key_registry(csv.as_bytes()).unwrap();
        assert_eq!(registry.get("k1"), Some(&ClientRecord::new("ClientA", "premium")));
    }

    #[test]
    fn test_header_names_are_case_sensitive() {
        let csv = "API_KEY,client_name,classification\nk1,ClientA,premium\n";
        assert!(matches!(read_key_registry(csv.as_bytes()), Err(LoadError::MissingColumns(_))));
    }

    #[test]
    fn test_empty_source_is_missing_columns() {
        assert!(matches!(read_key_registry("".as_bytes()), Err(LoadError::MissingColumns(_))));
    }

    #[test]
    fn test_short_key_row_is_kept() {
        let csv = "api_key,client_name,classification\nk1,ClientA\n";
        let registry = read_key_registry(csv.as_bytes()).unwrap();
        assert_eq!(registry.get("k1"), Some(&ClientRecord::new("ClientA", "")));
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let csv = "api_key,client_name,classification\n\
                   k1,Old,standard\n\
                   k1,New,premium\n";
        let registry = read_key_registry(csv.as_bytes()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("k1").unwrap().name, "New");
    }

    #[test]
    fn test_reads_cidr_rows_in_order() {
        let csv = "client_name,classification,cidr_ranges\n\
                   Corporate HQ,premium,\"192.168.1.0/24, 10.0.0.0/16\"\n\
                   IPv6 Client,standard,2001:db8:abcd::/48\n";
        let registry = read_cidr_registry(csv.as_bytes()).unwrap();

        let clients = registry.clients();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].client.name, "Corporate HQ");
        let nets: Vec<String> = clients[0].networks.iter().map(|n| n.to_string()).collect();
        assert_eq!(nets, vec!["192.168.1.0/24", "10.0.0.0/16"]);
        assert_eq!(clients[1].networks[0].to_string(), "2001:db8:abcd::/48");
    }

    #[test]
    fn test_mixed_validity_cell_keeps_valid_networks() {
        let csv = "client_name,classification,cidr_ranges\n\
                   Mixed,standard,\"10.0.0.0/8, 300.1.1.1/8\"\n";
        let registry = read_cidr_registry(csv.as_bytes()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.clients()[0].networks.len(), 1);
        assert_eq!(registry.clients()[0].networks[0].to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_all_malformed_cell_drops_client() {
        let csv = "client_name,classification,cidr_ranges\n\
                   Broken,standard,\"nope, 10.0.0.0/99\"\n\
                   Empty,standard,\n\
                   Good,premium,172.16.0.0/20\n";
        let registry = read_cidr_registry(csv.as_bytes()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.clients()[0].client.name, "Good");
    }

    #[test]
    fn test_host_bits_normalized_on_load() {
        let csv = "client_name,classification,cidr_ranges\nA,standard,192.168.1.5/24\n";
        let registry = read_cidr_registry(csv.as_bytes()).unwrap();
        assert_eq!(registry.clients()[0].networks[0].to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_mask_suffixes_load() {
        let csv = "client_name,classification,cidr_ranges\n\
                   Masked,premium,10.0.0.0/255.0.0.0\n\
                   Hostmask,standard,172.16.0.0/0.0.255.255\n\
                   Gappy,standard,192.168.0.0/255.0.255.0\n";
        let registry = read_cidr_registry(csv.as_bytes()).unwrap();

        let clients = registry.clients();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].client.name, "Masked");
        assert_eq!(clients[0].networks[0].to_string(), "10.0.0.0/8");
        assert_eq!(clients[1].client.name, "Hostmask");
        assert_eq!(clients[1].networks[0].to_string(), "172.16.0.0/16");
    }

    #[test]
    fn test_missing_cidr_columns() {
        let csv = "client_name,classification\nA,standard\n";
        match read_cidr_registry(csv.as_bytes()) {
            Err(LoadError::MissingColumns(missing)) => assert_eq!(missing, vec!["cidr_ranges"]),
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let path = Path::new("definitely/not/here/clients.csv");
        assert!(matches!(try_load_key_registry(path), Err(LoadError::Open { .. })));
        assert!(load_key_registry(path).is_empty());
        assert!(load_cidr_registry(path).is_empty());
    }
}
