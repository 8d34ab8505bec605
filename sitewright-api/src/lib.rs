//! Sitewright API - REST adapter for the revision engine
//!
//! A thin Axum layer: identity extraction, error mapping, and route
//! handlers delegating to `sitewright-engine`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{AuthUser, USER_ID_HEADER};
pub use routes::create_api_router;
pub use state::AppState;
