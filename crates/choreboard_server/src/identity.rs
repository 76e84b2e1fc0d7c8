//! Caller identity supplied by the upstream gateway.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use choreboard_core::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user id taken from `X-User-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .filter(|user_id| *user_id > 0)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}
