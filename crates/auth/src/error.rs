//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::Algorithm;
use parish_common::error_response;

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header required")]
    MissingAuthorization,

    #[error("invalid authorization header format")]
    InvalidAuthorizationFormat,

    #[error("malformed token")]
    MalformedToken,

    #[error("unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("signing key {0} not found")]
    KeyNotFound(String),

    #[error("token has no key id and the key set is ambiguous")]
    AmbiguousKey,

    #[error("jwks fetch failed: {0}")]
    JwksFetch(String),

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("token subject missing")]
    MissingSubject,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token subject is not a valid user id")]
    InvalidUserId,

    #[error("failed to load user")]
    UserLoadError,

    #[error("failed to provision user")]
    UserProvisionFailed,
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AuthError::MissingAuthorization => (
                StatusCode::UNAUTHORIZED,
                "MISSING_AUTHORIZATION",
                "Authorization header required",
            ),
            AuthError::InvalidAuthorizationFormat => (
                StatusCode::UNAUTHORIZED,
                "INVALID_AUTHORIZATION",
                "Invalid authorization header format",
            ),
            AuthError::MalformedToken
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::KeyNotFound(_)
            | AuthError::AmbiguousKey
            | AuthError::JwksFetch(_)
            | AuthError::IssuerMismatch
            | AuthError::MissingSubject
            | AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token",
            ),
            AuthError::InvalidUserId => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid user ID in token",
            ),
            AuthError::UserLoadError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_LOAD_ERROR",
                "Failed to load user",
            ),
            AuthError::UserProvisionFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_PROVISION_ERROR",
                "Failed to provision user",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        tracing::debug!(reason = %self, "Request rejected by authentication");

        error_response(status, code, message)
    }
}

impl From<AuthError> for parish_common::Error {
    fn from(err: AuthError) -> Self {
        match err.parts().0 {
            StatusCode::UNAUTHORIZED => parish_common::Error::Authentication(err.to_string()),
            _ => parish_common::Error::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::MissingAuthorization, StatusCode::UNAUTHORIZED),
            (
                AuthError::InvalidAuthorizationFormat,
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::MalformedToken, StatusCode::UNAUTHORIZED),
            (
                AuthError::UnsupportedAlgorithm(Algorithm::HS256),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthError::KeyNotFound("k1".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::AmbiguousKey, StatusCode::UNAUTHORIZED),
            (
                AuthError::JwksFetch("timeout".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::IssuerMismatch, StatusCode::UNAUTHORIZED),
            (AuthError::MissingSubject, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidUserId, StatusCode::UNAUTHORIZED),
            (AuthError::UserLoadError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AuthError::UserProvisionFailed,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_auth_error_into_common_error() {
        let err: parish_common::Error = AuthError::IssuerMismatch.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: parish_common::Error = AuthError::UserLoadError.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
