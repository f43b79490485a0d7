//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware/access_control.rs (credential → Resolver → client)
//!         /data    : x-api-key header
//!         /ip-data : X-Forwarded-For or peer address (client_ip.rs)
//!     → response.rs (welcome body or rejection)
//! ```

pub mod client_ip;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
