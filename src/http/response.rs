//! Response shaping.
//!
//! # Design Decisions
//! - Success: `{"message": "Welcome <name>", "classification": ...}`, plus
//!   `matched_cidr` and `client_ip` for IP-identified clients
//! - Failure: `{"valid": false, "error": {"message": ...}}`
//! - Status per rejection: missing → 400, bad key → 401, IP → 403

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::http::middleware::access_control::AuthenticatedClient;
use crate::resolver::Rejection;

/// HTTP status for each rejection kind.
pub fn status_for(rejection: &Rejection) -> StatusCode {
    match rejection {
        Rejection::MissingCredential(_) => StatusCode::BAD_REQUEST,
        Rejection::InvalidCredential => StatusCode::UNAUTHORIZED,
        Rejection::InvalidAddressFormat | Rejection::NotAuthorized => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = json!({
            "valid": false,
            "error": { "message": self.to_string() },
        });
        (status_for(&self), Json(body)).into_response()
    }
}

/// Body returned to an identified client.
#[derive(Debug, Serialize)]
pub struct WelcomeBody {
    pub message: String,
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl From<&AuthenticatedClient> for WelcomeBody {
    fn from(auth: &AuthenticatedClient) -> Self {
        Self {
            message: format!("Welcome {}", auth.client.name),
            classification: auth.client.classification.clone(),
            matched_cidr: auth.client.matched_network.map(|n| n.to_string()),
            client_ip: auth.client_ip.clone(),
        }
    }
}
