//! Community domain errors
//!
//! Each variant carries its own wire code; the `From` impl folds them into
//! the shared `Error` kinds for callers outside the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parish_common::{error_response, Error, RepositoryError, StateError};

#[derive(Debug, thiserror::Error)]
pub enum CommunityError {
    #[error("invalid group name")]
    InvalidGroupName,

    #[error("invalid group description")]
    InvalidGroupDescription,

    #[error("invalid displayName")]
    InvalidDisplayName,

    #[error("invalid username")]
    InvalidUsername,

    #[error("you cannot add yourself")]
    CannotFriendSelf,

    #[error("user not found")]
    UserNotFound,

    #[error("group not found")]
    GroupNotFound,

    #[error("invite only group")]
    GroupInviteOnly,

    #[error("group admin access required")]
    GroupAdminRequired,

    #[error("join request not found")]
    JoinRequestNotFound,

    #[error("friend request already exists")]
    FriendRequestExists,

    #[error("friend request not found")]
    FriendRequestNotFound,

    #[error("username already in use")]
    UsernameTaken,

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CommunityError {
    fn from(err: sqlx::Error) -> Self {
        CommunityError::Repository(RepositoryError::Connection(err))
    }
}

impl CommunityError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            CommunityError::InvalidGroupName
            | CommunityError::InvalidGroupDescription
            | CommunityError::InvalidDisplayName
            | CommunityError::InvalidUsername => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CommunityError::CannotFriendSelf => (StatusCode::BAD_REQUEST, "CANNOT_ADD_SELF"),
            CommunityError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            CommunityError::GroupNotFound => (StatusCode::NOT_FOUND, "GROUP_NOT_FOUND"),
            CommunityError::GroupInviteOnly => (StatusCode::FORBIDDEN, "GROUP_INVITE_ONLY"),
            CommunityError::GroupAdminRequired => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            CommunityError::JoinRequestNotFound => {
                (StatusCode::NOT_FOUND, "JOIN_REQUEST_NOT_FOUND")
            }
            CommunityError::FriendRequestExists => (StatusCode::CONFLICT, "FRIEND_REQUEST_EXISTS"),
            CommunityError::FriendRequestNotFound => {
                (StatusCode::NOT_FOUND, "FRIEND_REQUEST_NOT_FOUND")
            }
            CommunityError::UsernameTaken => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
            CommunityError::State(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            CommunityError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for CommunityError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Community operation failed");
            return error_response(status, code, "Unexpected error");
        }
        error_response(status, code, &self.to_string())
    }
}

impl From<CommunityError> for Error {
    fn from(err: CommunityError) -> Self {
        match err {
            CommunityError::InvalidGroupName
            | CommunityError::InvalidGroupDescription
            | CommunityError::InvalidDisplayName
            | CommunityError::InvalidUsername
            | CommunityError::CannotFriendSelf => Error::Validation(err.to_string()),
            CommunityError::UserNotFound
            | CommunityError::GroupNotFound
            | CommunityError::JoinRequestNotFound
            | CommunityError::FriendRequestNotFound => Error::NotFound(err.to_string()),
            CommunityError::GroupInviteOnly | CommunityError::GroupAdminRequired => {
                Error::Forbidden(err.to_string())
            }
            CommunityError::FriendRequestExists | CommunityError::UsernameTaken => {
                Error::Conflict(err.to_string())
            }
            CommunityError::State(e) => e.into(),
            CommunityError::Repository(e) => e.into(),
        }
    }
}
