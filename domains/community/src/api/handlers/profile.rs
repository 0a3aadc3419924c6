//! Profile handlers
//!
//! - GET /v1/profile - Get the caller's profile
//! - PATCH /v1/profile - Update display name, username, avatar
//! - GET /v1/username-availability - Check whether a username is free

use axum::{
    extract::{Query, State},
    Json,
};
use parish_common::ValidatedJson;
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::{AuthUser, CommunityState, MaybeAuthUser};
use crate::domain::entities::{UserProfile, UsernameAvailability};
use crate::error::CommunityError;
use crate::service::ProfileChanges;

/// Request for updating the caller's profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Blank keeps the current display name
    #[validate(length(max = 200))]
    pub display_name: Option<String>,

    #[validate(length(max = 64))]
    pub username: String,

    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub username: String,
}

/// GET /v1/profile - Get current user profile
pub async fn get_profile(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
) -> Result<Json<UserProfile>, CommunityError> {
    let profile = state.service.get_profile(auth.user_id()).await?;
    Ok(Json(profile))
}

/// PATCH /v1/profile - Update user profile
pub async fn update_profile(
    AuthUser(auth): AuthUser,
    State(state): State<CommunityState>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, CommunityError> {
    let profile = state
        .service
        .update_profile(
            auth.user_id(),
            ProfileChanges {
                display_name: request.display_name.as_deref(),
                username: &request.username,
                avatar_url: request.avatar_url.as_deref(),
            },
        )
        .await?;
    Ok(Json(profile))
}

/// GET /v1/username-availability?username=... - Public; a signed-in caller's
/// own username reports as available
pub async fn username_availability(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<CommunityState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<UsernameAvailability>, CommunityError> {
    let viewer = auth.map(|ctx| ctx.user_id());
    let availability = state
        .service
        .username_availability(&query.username, viewer)
        .await?;
    Ok(Json(availability))
}
