//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use covault_engine::EngineError;
use covault_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    fn status(&self) -> StatusCode {
        match self {
            RpcError::Engine(EngineError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            RpcError::Engine(EngineError::NotFound(_))
            | RpcError::Engine(EngineError::NoTransactions) => StatusCode::NOT_FOUND,
            // Terminal-state, duplicate-vote, quorum, and admission failures
            // are all conflicts with the current engine state.
            RpcError::Engine(_) => StatusCode::CONFLICT,
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Store(_) | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
