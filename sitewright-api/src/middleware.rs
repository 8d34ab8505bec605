//! Verified-identity extraction
//!
//! Authentication lives in a collaborator in front of this service; by the
//! time a request arrives here its identity has been verified and is carried
//! in the `x-user-id` header (reverse-proxy style). The extractor only
//! parses that header - it performs no validation of its own.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use sitewright_core::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the verified user identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user's identity.
///
/// ```ignore
/// async fn handler(AuthUser(user_id): AuthUser) -> impl IntoResponse { ... }
/// ```
///
/// Rejects with 401 when the header is missing or not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing verified identity header"))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| ApiError::unauthorized("Malformed identity header"))?;

        Ok(AuthUser(user_id))
    }
}
