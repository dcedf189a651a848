//! HTTP surface over the signal engine.

/// Query string parsing
pub mod params;
/// Router and handlers
pub mod routes;

pub use routes::{router, serve, AppState};
