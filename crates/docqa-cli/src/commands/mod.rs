//! Command implementations

pub mod ask;
pub mod ingest;
pub mod serve;
