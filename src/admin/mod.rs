//! Admin API.
//!
//! Served on its own listener, guarded by a Bearer token.
//!
//! - `GET  /admin/status`  : version and registry sizes
//! - `POST /admin/reload`  : reload the registries now
//! - `GET  /admin/clients` : registered clients (no keys)

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::lifecycle::shutdown;
use crate::resolver::Resolver;
use self::auth::admin_auth_middleware;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub resolver: Arc<Resolver>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/reload", post(post_reload))
        .route("/admin/clients", get(get_clients))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until `shutdown` fires.
pub async fn run_admin_server(
    listener: TcpListener,
    state: AdminState,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin API starting");
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown::wait(shutdown))
        .await
}
