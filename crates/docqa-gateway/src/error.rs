//! Gateway error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docqa_kernel::error::RagError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The pipeline failed in retrieval or generation.
    #[error("upstream failure: {0}")]
    Upstream(#[from] RagError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GatewayError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            GatewayError::Upstream(err) => {
                error!(
                    error = %err,
                    retrieval = err.is_retrieval_failure(),
                    generation = err.is_generation_failure(),
                    "query failed"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_FAILURE",
                    "the query could not be answered".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
