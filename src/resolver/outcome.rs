//! Resolution outcomes.

use serde::Serialize;
use thiserror::Error;

use crate::registry::{ClientRecord, NetworkRange};

/// Which credential a request was expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    ApiKey,
    ClientIp,
}

impl CredentialKind {
    /// Message returned when this credential is absent.
    pub fn missing_message(&self) -> &'static str {
        match self {
            CredentialKind::ApiKey => "API key missing",
            CredentialKind::ClientIp => "Could not determine client IP",
        }
    }
}

/// Why a credential did not resolve to a client.
///
/// The variants are disjoint: a malformed address is never reported as
/// unauthorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// No credential was supplied. Detected by the caller.
    #[error("{}", .0.missing_message())]
    MissingCredential(CredentialKind),

    #[error("Invalid API Key")]
    InvalidCredential,

    #[error("Invalid IP address format")]
    InvalidAddressFormat,

    #[error("IP address not authorized")]
    NotAuthorized,
}

impl Rejection {
    /// Stable label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingCredential(_) => "missing_credential",
            Rejection::InvalidCredential => "invalid_credential",
            Rejection::InvalidAddressFormat => "invalid_address_format",
            Rejection::NotAuthorized => "not_authorized",
        }
    }
}

/// A successfully identified client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClient {
    pub name: String,
    pub classification: String,
    /// The network that matched, for IP resolution only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_network: Option<NetworkRange>,
}

impl ResolvedClient {
    pub(crate) fn from_record(record: &ClientRecord, matched_network: Option<NetworkRange>) -> Self {
        Self {
            name: record.name.clone(),
            classification: record.classification.clone(),
            matched_network,
        }
    }
}

pub type ClientResult = Result<ResolvedClient, Rejection>;
