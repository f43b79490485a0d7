//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client_gate::config::GateConfig;
use client_gate::http::HttpServer;
use client_gate::lifecycle::Shutdown;
use client_gate::registry::RegistrySource;
use client_gate::resolver::Resolver;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const KEY_HEADER: &str = "api_key,client_name,classification";
pub const CIDR_HEADER: &str = "client_name,classification,cidr_ranges";

pub const CLIENTS_CSV: &str = "api_key,client_name,classification
12345-ABCDE,ClientA,premium
98765-ZYXWV,ClientB,standard
";

pub const IP_CLIENTS_CSV: &str = r#"client_name,classification,cidr_ranges
Corporate HQ,premium,"192.168.1.0/24, 10.0.0.0/16"
Branch Office,standard,172.16.0.0/20
Remote Workers,standard,"203.0.113.0/24, 198.51.100.0/24"
Mobile Users,standard,"192.168.100.0/24, 2001:db8:1234::/48"
IPv6 Client,premium,2001:db8:abcd::/48
"#;

/// Registry sources written to a temporary directory.
pub struct Sources {
    pub dir: TempDir,
    pub keys: PathBuf,
    pub ips: PathBuf,
}

impl Sources {
    pub fn new(keys_csv: &str, ip_csv: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let keys = dir.path().join("clients.csv");
        let ips = dir.path().join("ip_clients.csv");
        fs::write(&keys, keys_csv).unwrap();
        fs::write(&ips, ip_csv).unwrap();
        Self { dir, keys, ips }
    }

    pub fn sample() -> Self {
        Self::new(CLIENTS_CSV, IP_CLIENTS_CSV)
    }

    pub fn source(&self) -> RegistrySource {
        RegistrySource::new(&self.keys, &self.ips)
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.source())
    }

    /// Replace a file in one rename so readers never see it half written.
    pub fn replace(&self, path: &Path, content: &str) {
        let staging = self.dir.path().join(".staging.csv");
        fs::write(&staging, content).unwrap();
        fs::rename(&staging, path).unwrap();
    }
}

/// Start the public server on an ephemeral port.
pub async fn start_gate(resolver: Arc<Resolver>, config: GateConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, resolver);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
