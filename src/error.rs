//! Error taxonomy for the service.
//!
//! Every fallible path funnels into [`Error`], which maps onto the HTTP
//! status the API surfaces: validation problems are 400, identity problems
//! 401/403, missing rows 404, state conflicts 409. Database failures are
//! logged and hidden behind a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("field {0} is required")]
    MissingField(&'static str),

    #[error("feedback is required for rejection")]
    FeedbackRequired,

    #[error("points award must be non-negative")]
    InvalidPoints,

    #[error("authentication required")]
    Unauthenticated,

    #[error("account is inactive or pending approval")]
    InactiveAccount,

    #[error("permission denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("material already reviewed")]
    AlreadyReviewed,

    #[error("user is not pending approval")]
    UserNotPending,

    #[error("username or email already registered")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingField(_) | Error::FeedbackRequired | Error::InvalidPoints => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InactiveAccount | Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyReviewed | Error::UserNotPending | Error::Duplicate => {
                StatusCode::CONFLICT
            }
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error payload consumed by the dashboards.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::MissingField("name").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::FeedbackRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::InactiveAccount.status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::NotFound("material").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::AlreadyReviewed.status(), StatusCode::CONFLICT);
        assert_eq!(Error::UserNotPending.status(), StatusCode::CONFLICT);
        assert_eq!(
            Error::Database(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
