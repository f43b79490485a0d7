//! Access Control Middleware.
//! Resolves the request's credential to a client before the handler runs.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::client_ip::client_address;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resolver::{CredentialKind, Rejection, ResolvedClient};

pub const X_API_KEY: &str = "x-api-key";

/// Context attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct AuthenticatedClient {
    pub client: ResolvedClient,
    /// Address the client was identified by, for IP resolution.
    pub client_ip: Option<String>,
}

/// Reads the API key header. Absent or empty is a missing credential; a
/// value that is not visible ASCII cannot be a registered key.
fn api_key(headers: &HeaderMap) -> Result<&str, Rejection> {
    match headers.get(X_API_KEY) {
        None => Err(Rejection::MissingCredential(CredentialKind::ApiKey)),
        Some(value) if value.is_empty() => Err(Rejection::MissingCredential(CredentialKind::ApiKey)),
        Some(value) => value.to_str().map_err(|_| Rejection::InvalidCredential),
    }
}

/// Requires a registered `x-api-key`.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(req.headers()).to_string();

    let outcome = api_key(req.headers()).and_then(|key| state.resolver.resolve_by_key(key));

    let response = match outcome {
        Ok(client) => {
            tracing::info!(request_id = %request_id, client = %client.name, "Successful request");
            req.extensions_mut().insert(AuthenticatedClient {
                client,
                client_ip: None,
            });
            next.run(req).await
        }
        Err(rejection @ Rejection::MissingCredential(_)) => {
            tracing::warn!(request_id = %request_id, "Request received without API key");
            rejection.into_response()
        }
        Err(rejection) => {
            // Never log the presented key.
            tracing::info!(request_id = %request_id, "Invalid API key attempt");
            rejection.into_response()
        }
    };

    metrics::record_request("/data", response.status().as_u16(), start);
    response
}

/// Requires the client address to fall inside a registered network.
pub async fn client_ip_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(req.headers()).to_string();

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let address = client_address(req.headers(), peer, state.client_ip.trust_forwarded_for);

    let response = match address {
        None => {
            tracing::warn!(request_id = %request_id, "Could not determine client IP address");
            Rejection::MissingCredential(CredentialKind::ClientIp).into_response()
        }
        Some(address) => match state.resolver.resolve_by_ip(&address) {
            Ok(client) => {
                tracing::info!(
                    request_id = %request_id,
                    client = %client.name,
                    client_ip = %address,
                    matched_cidr = ?client.matched_network.map(|n| n.to_string()),
                    "Successful IP-based request"
                );
                req.extensions_mut().insert(AuthenticatedClient {
                    client,
                    client_ip: Some(address),
                });
                next.run(req).await
            }
            Err(rejection) => {
                tracing::info!(
                    request_id = %request_id,
                    client_ip = %address,
                    reason = rejection.label(),
                    "Unauthorized IP address attempt"
                );
                rejection.into_response()
            }
        },
    };

    metrics::record_request("/ip-data", response.status().as_u16(), start);
    response
}
