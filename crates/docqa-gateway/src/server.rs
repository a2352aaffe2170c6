//! Axum HTTP server for the question-answering pipeline.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/query` | Answer `{"query": ...}` from the indexed documents. |
//! | `GET`  | `/health` | Liveness check. |

use crate::handlers::{health_router, query_router};
use crate::state::AppState;
use axum::Router;
use docqa_foundation::rag::RagPipeline;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Runtime configuration for [`QueryServer`].
#[derive(Debug, Clone)]
pub struct QueryServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for QueryServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl QueryServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub struct QueryServer {
    config: QueryServerConfig,
    pipeline: RagPipeline,
}

impl QueryServer {
    pub fn new(config: QueryServerConfig, pipeline: RagPipeline) -> Self {
        Self { config, pipeline }
    }

    /// Build the axum [`Router`]. Call [`start()`](Self::start) to bind and serve.
    pub fn build_app(&self) -> Router {
        let state = Arc::new(AppState::new(self.pipeline.clone()));
        Router::new()
            .merge(query_router())
            .merge(health_router())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind `host:port` and serve until Ctrl-C.
    pub async fn start(self) -> std::io::Result<()> {
        let app = self.build_app();
        let addr = self.config.addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "DocQA gateway listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
