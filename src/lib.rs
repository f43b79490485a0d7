//! Client identification gate.
//!
//! Maps an API key or a source IP address to a named client and its
//! service classification.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resolver;

pub use config::schema::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{Registries, RegistrySource};
pub use resolver::{ClientResult, Rejection, ResolvedClient, Resolver};
