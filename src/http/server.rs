//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the identification endpoints
//! - Wire up middleware (request ID, tracing, timeout, access control)
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ClientIpConfig, GateConfig};
use crate::http::middleware::access_control::{api_key_middleware, client_ip_middleware, AuthenticatedClient};
use crate::http::request::UuidRequestId;
use crate::http::response::WelcomeBody;
use crate::lifecycle::shutdown;
use crate::resolver::Resolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub client_ip: ClientIpConfig,
}

/// Public HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: GateConfig, resolver: Arc<Resolver>) -> Self {
        let state = AppState {
            resolver,
            client_ip: config.client_ip.clone(),
        };
        Self {
            router: build_router(&config, state),
        }
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GateConfig, state: AppState) -> Router {
    let by_key = Router::new()
        .route("/data", get(welcome))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_middleware));

    let by_ip = Router::new()
        .route("/ip-data", get(welcome))
        .route_layer(middleware::from_fn_with_state(state.clone(), client_ip_middleware));

    Router::new()
        .merge(by_key)
        .merge(by_ip)
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

async fn welcome(Extension(auth): Extension<AuthenticatedClient>) -> Json<WelcomeBody> {
    Json(WelcomeBody::from(&auth))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
