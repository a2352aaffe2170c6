//! Question answering endpoint
//!
//! POST /query - run the pipeline for one question

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use docqa_foundation::rag::QueryResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::GatewayResult;
use crate::error::GatewayError;
use crate::state::AppState;

/// Request body for POST /query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// POST /query
///
/// A blank query is answered normally with `"Invalid user query"`; only a
/// malformed body is a 400.
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> GatewayResult<Json<QueryResponse>> {
    let Json(request) = payload.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;

    let output = state.pipeline.run(request.query).await?;
    info!(
        validated = output.validated,
        chunks = output.retrieval.len(),
        confidence = output.confidence(),
        "query answered"
    );
    Ok(Json(output.into_response()))
}

pub fn query_router() -> axum::Router<Arc<AppState>> {
    axum::Router::new().route("/query", post(query))
}
