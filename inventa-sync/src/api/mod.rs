//! HTTP API handlers

pub mod articles;
pub mod health;
pub mod sync;

pub use articles::article_routes;
pub use health::health_routes;
pub use sync::sync_routes;
