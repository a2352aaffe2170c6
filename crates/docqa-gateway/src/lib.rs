//! `docqa-gateway` - HTTP surface for the DocQA pipeline.
//!
//! ```rust,no_run
//! use docqa_foundation::rag::RagPipeline;
//! use docqa_gateway::server::{QueryServer, QueryServerConfig};
//!
//! # async fn run(pipeline: RagPipeline) -> std::io::Result<()> {
//! QueryServer::new(QueryServerConfig::default(), pipeline)
//!     .start()
//!     .await
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use server::{QueryServer, QueryServerConfig};
