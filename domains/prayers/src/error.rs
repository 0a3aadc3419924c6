//! Prayers domain errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parish_common::{error_response, Error, RepositoryError};

/// Errors returned by prayer request operations
#[derive(Debug, thiserror::Error)]
pub enum PrayerError {
    #[error("invalid title")]
    InvalidTitle,

    #[error("invalid body")]
    InvalidBody,

    #[error("groupIds required for GROUP_ONLY")]
    GroupIdsRequired,

    #[error("PRIVATE requests cannot include groupIds")]
    PrivateWithGroups,

    #[error("you can only post to groups where you are a member")]
    GroupAccessDenied,

    #[error("prayer request not found")]
    NotFound,

    #[error("only the author can modify this prayer request")]
    NotAuthor,

    #[error("you can pray again later for this request")]
    RateLimited,

    #[error("sign in to see this feed")]
    ViewerRequired,

    #[error(transparent)]
    State(#[from] parish_common::StateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PrayerError {
    fn from(err: sqlx::Error) -> Self {
        PrayerError::Repository(RepositoryError::Connection(err))
    }
}

impl PrayerError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            PrayerError::InvalidTitle
            | PrayerError::InvalidBody
            | PrayerError::GroupIdsRequired
            | PrayerError::PrivateWithGroups => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PrayerError::GroupAccessDenied => (StatusCode::FORBIDDEN, "GROUP_ACCESS_DENIED"),
            PrayerError::NotAuthor => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            PrayerError::NotFound => (StatusCode::NOT_FOUND, "PRAYER_REQUEST_NOT_FOUND"),
            PrayerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "PRAYED_RATE_LIMITED"),
            PrayerError::ViewerRequired => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            PrayerError::State(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            PrayerError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for PrayerError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Prayer request operation failed");
            return error_response(status, code, "Unexpected error");
        }
        error_response(status, code, &self.to_string())
    }
}

impl From<PrayerError> for Error {
    fn from(err: PrayerError) -> Self {
        match err {
            PrayerError::InvalidTitle
            | PrayerError::InvalidBody
            | PrayerError::GroupIdsRequired
            | PrayerError::PrivateWithGroups => Error::Validation(err.to_string()),
            PrayerError::GroupAccessDenied | PrayerError::NotAuthor => {
                Error::Forbidden(err.to_string())
            }
            PrayerError::NotFound => Error::NotFound(err.to_string()),
            PrayerError::RateLimited => Error::RateLimit(err.to_string()),
            PrayerError::ViewerRequired => Error::Authentication(err.to_string()),
            PrayerError::State(e) => e.into(),
            PrayerError::Repository(e) => e.into(),
        }
    }
}
