//! HTTP error mapping.
//!
//! # Invariants
//! - Every failure renders the `{"success":"ko","message",...}` envelope.
//! - Cross-family and inactive-chore access render exactly like a missing
//!   chore.
//! - 500 bodies carry a fixed message; details go to the log only.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use choreboard_core::{ChoreServiceError, RepoError, ValidationErrors};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid X-User-Id header")]
    Unauthorized,
    #[error("resource not found")]
    NotFound,
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Service(#[from] ChoreServiceError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Service(value.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Malformed(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Malformed(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound | Self::Service(ChoreServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Malformed(_)
            | Self::Service(ChoreServiceError::NoCurrentFamily(_))
            | Self::Service(ChoreServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Unauthorized => json!({
                "success": "ko",
                "message": "Unauthenticated.",
            }),
            Self::NotFound | Self::Service(ChoreServiceError::NotFound(_)) => json!({
                "success": "ko",
                "message": "Not found.",
            }),
            Self::Malformed(detail) => json!({
                "success": "ko",
                "message": detail,
            }),
            Self::Service(ChoreServiceError::NoCurrentFamily(_)) => json!({
                "success": "ko",
                "message": "User has no current family selected.",
            }),
            Self::Service(ChoreServiceError::Validation(errors)) => json!({
                "success": "ko",
                "message": "The given data was invalid.",
                "errors": errors,
            }),
            Self::Service(_) | Self::Internal(_) => json!({
                "success": "ko",
                "message": "Server error.",
            }),
        };

        if status.is_server_error() {
            error!(
                "event=http_error module=server status=error code={} error={}",
                status.as_u16(),
                self
            );
        } else {
            warn!(
                "event=http_error module=server status=rejected code={} kind={}",
                status.as_u16(),
                self.kind()
            );
        }

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Malformed(_) => "malformed",
            Self::Service(ChoreServiceError::NotFound(_)) => "chore_not_found",
            Self::Service(ChoreServiceError::NoCurrentFamily(_)) => "no_current_family",
            Self::Service(ChoreServiceError::Validation(_)) => "validation",
            Self::Service(_) => "service",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use choreboard_core::{ChoreServiceError, PeriodError, ValidationErrors};

    #[test]
    fn service_errors_map_to_documented_statuses() {
        assert_eq!(
            ApiError::from(ChoreServiceError::NotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ChoreServiceError::NoCurrentFamily(3)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ValidationErrors::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ChoreServiceError::Period(PeriodError::InvalidFrequency(
                "hourly".to_string()
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
