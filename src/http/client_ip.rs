//! Client address extraction for IP-based resolution.
//!
//! # Design Decisions
//! - A present `X-Forwarded-For` header is authoritative when trusted:
//!   its first comma-separated entry is used, trimmed, with no fallback
//! - The socket peer is used otherwise; IPv4-mapped IPv6 peers (from a
//!   dual-stack listener) are reported as plain IPv4
//! - Header values are passed through unparsed; validation belongs to
//!   the resolver

use std::net::SocketAddr;

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The address string to resolve, or `None` if it cannot be determined.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> Option<String> {
    if trust_forwarded_for {
        if let Some(value) = headers.get(X_FORWARDED_FOR) {
            return value
                .to_str()
                .ok()
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
        }
    }

    peer.map(|addr| addr.ip().to_canonical().to_string())
}
