//! Friendship and user directory handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use parish_common::ValidatedJson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Items, SearchQuery, StatusResponse};
use crate::api::middleware::{AuthUser, CommunityState};
use crate::domain::entities::{Friend, FriendRequest, UserSummary};
use crate::error::CommunityError;

#[derive(Debug, Deserialize, Validate)]
pub struct SendFriendRequest {
    /// Target username; surrounding whitespace, case and a leading `@` are ignored
    #[validate(length(max = 64))]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct FriendRequestCreated {
    pub id: Uuid,
    pub status: &'static str,
}

/// **GET /v1/friends**
pub async fn list_friends(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
) -> Result<Json<Items<Friend>>, CommunityError> {
    let friends = state.service.list_friends(auth.user_id()).await?;
    Ok(Json(friends.into()))
}

/// Pending requests addressed to the caller
///
/// **GET /v1/friends/requests**
pub async fn list_pending_requests(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
) -> Result<Json<Items<FriendRequest>>, CommunityError> {
    let requests = state
        .service
        .list_pending_friend_requests(auth.user_id())
        .await?;
    Ok(Json(requests.into()))
}

/// Send a friend request by username
///
/// **POST /v1/friends/requests**
///
/// Any existing row between the two users, in either direction and in any
/// status, answers 409.
pub async fn send_request(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    ValidatedJson(request): ValidatedJson<SendFriendRequest>,
) -> Result<(StatusCode, Json<FriendRequestCreated>), CommunityError> {
    let friendship = state
        .service
        .send_friend_request(auth.user_id(), &request.username)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FriendRequestCreated {
            id: friendship.id,
            status: "requested",
        }),
    ))
}

/// **POST /v1/friends/requests/{request_id}/accept**
pub async fn accept_request(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<StatusResponse<&'static str>>, CommunityError> {
    state
        .service
        .accept_friend_request(auth.user_id(), request_id)
        .await?;
    Ok(Json(StatusResponse { status: "accepted" }))
}

/// Users the caller is not yet connected to
///
/// **GET /v1/users/search?q=...&limit=...**
pub async fn search_users(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Items<UserSummary>>, CommunityError> {
    let users = state
        .service
        .search_users(auth.user_id(), &query.q, query.limit)
        .await?;
    Ok(Json(users.into()))
}
