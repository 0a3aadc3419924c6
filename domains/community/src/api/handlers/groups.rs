//! Group and join request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use parish_common::ValidatedJson;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{Items, SearchQuery, StatusResponse};
use crate::api::middleware::{AuthUser, CommunityState};
use crate::domain::entities::{
    Group, GroupDraft, GroupJoinPolicy, GroupSearchResult, GroupWithRole, PendingJoinRequest,
};
use crate::error::CommunityError;
use crate::service::JoinOutcome;

/// Request for creating a group
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,

    pub description: Option<String>,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    /// Defaults to `REQUEST`
    pub join_policy: Option<GroupJoinPolicy>,
}

/// List groups the caller belongs to
///
/// **GET /v1/groups**
pub async fn list_my_groups(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
) -> Result<Json<Items<GroupWithRole>>, CommunityError> {
    let groups = state.service.list_my_groups(auth.user_id()).await?;
    Ok(Json(groups.into()))
}

/// Search groups by name
///
/// **GET /v1/groups/search?q=...&limit=...**
pub async fn search_groups(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Items<GroupSearchResult>>, CommunityError> {
    let groups = state
        .service
        .search_groups(auth.user_id(), &query.q, query.limit)
        .await?;
    Ok(Json(groups.into()))
}

/// Create a group
///
/// **POST /v1/groups**
///
/// The creator becomes the group's first `ADMIN` member.
pub async fn create_group(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), CommunityError> {
    let draft = GroupDraft::new(
        &request.name,
        request.description.as_deref(),
        request.image_url.as_deref(),
        request.join_policy,
    )?;
    let group = state.service.create_group(auth.user_id(), draft).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Ask to join a group
///
/// **POST /v1/groups/{id}/join-requests**
///
/// Open groups admit immediately (`joined`); request groups file a pending
/// request (`requested`); invite-only groups refuse with 403.
pub async fn join_group(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<StatusResponse<JoinOutcome>>, CommunityError> {
    let outcome = state.service.join_group(auth.user_id(), group_id).await?;
    Ok(Json(StatusResponse { status: outcome }))
}

/// List pending join requests (group admins only)
///
/// **GET /v1/groups/{id}/join-requests**
pub async fn list_join_requests(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Items<PendingJoinRequest>>, CommunityError> {
    let requests = state
        .service
        .list_join_requests(auth.user_id(), group_id)
        .await?;
    Ok(Json(requests.into()))
}

/// Approve a join request (group admins only)
///
/// **POST /v1/groups/{id}/join-requests/{request_id}/approve**
pub async fn approve_join_request(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    Path((group_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StatusResponse<&'static str>>, CommunityError> {
    state
        .service
        .approve_join_request(auth.user_id(), group_id, request_id)
        .await?;
    Ok(Json(StatusResponse { status: "approved" }))
}
