//! Axum-based RPC server.

use crate::error::RpcError;
use crate::handlers;
use crate::state::VaultState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub struct RpcServer {
    pub port: u16,
    state: Arc<VaultState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<VaultState>) -> Self {
        Self { port, state }
    }

    /// Build the router; separated from [`start`] so tests can drive the
    /// routes without binding a socket.
    ///
    /// [`start`]: RpcServer::start
    pub fn router(state: Arc<VaultState>) -> Router {
        Router::new()
            .route("/submit", post(handlers::submit))
            .route("/approve", post(handlers::approve))
            .route("/reject", post(handlers::reject))
            .route("/execute", post(handlers::execute))
            .route("/transaction/:index", get(handlers::get_transaction))
            .route("/last_index", get(handlers::last_index))
            .route("/pending", get(handlers::pending))
            .route("/health", get(handlers::health))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the RPC server. Runs until the process is stopped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let router = Self::router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!("RPC server listening on {addr}");
        axum::serve(listener, router)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
