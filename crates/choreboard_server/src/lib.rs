//! HTTP surface for the Choreboard core.
//!
//! Identity comes from the `X-User-Id` header set by an upstream gateway;
//! everything else is delegated to `choreboard_core` services.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
