//! HTTP API for the Storefront order-fulfillment engine.
//!
//! The router is generic over the storage seam so handler tests run
//! against the in-memory store while the server binary runs against
//! PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
