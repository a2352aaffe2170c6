//! Request handlers

pub mod health;
pub mod query;

pub use health::health_router;
pub use query::query_router;
