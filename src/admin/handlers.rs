use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::lifecycle::reload::{reload_now, ReloadTrigger};
use crate::registry::{CidrClientRecord, ClientRecord, Registries};

#[derive(Debug, Serialize)]
pub struct RegistryStatus {
    pub api_keys: usize,
    pub ip_clients: usize,
    pub loaded_at: u64,
}

impl From<&Registries> for RegistryStatus {
    fn from(registries: &Registries) -> Self {
        Self {
            api_keys: registries.keys.len(),
            ip_clients: registries.networks.len(),
            loaded_at: registries.loaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub registries: RegistryStatus,
}

/// Registered clients. API keys are never returned.
#[derive(Debug, Serialize)]
pub struct ClientListing {
    pub key_clients: Vec<ClientRecord>,
    pub ip_clients: Vec<CidrClientRecord>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.resolver.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        registries: RegistryStatus::from(snapshot.as_ref()),
    })
}

pub async fn post_reload(State(state): State<AdminState>) -> Result<Json<RegistryStatus>, StatusCode> {
    let registries = reload_now(&state.resolver, ReloadTrigger::Admin)
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(RegistryStatus::from(registries.as_ref())))
}

pub async fn get_clients(State(state): State<AdminState>) -> Json<ClientListing> {
    let snapshot = state.resolver.snapshot();
    Json(ClientListing {
        key_clients: snapshot.keys.clients().into_iter().cloned().collect(),
        ip_clients: snapshot.networks.clients().to_vec(),
    })
}
