//! Prayer request handlers
//!
//! Create, read, update, delete, and pray. Every lookup that the caller is
//! not allowed to see answers 404, never 403.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use parish_common::ValidatedJson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::{AuthUser, PrayersState};
use crate::domain::entities::{
    PrayerActionType, PrayerCategory, PrayerRequestDraft, Visibility,
};
use crate::domain::view::PrayerRequestView;
use crate::error::PrayerError;

/// Body for creating or replacing a prayer request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequestBody {
    pub title: String,
    pub body: String,
    pub category: PrayerCategory,
    pub visibility: Visibility,
    #[serde(default)]
    pub allow_anonymous: bool,
    /// At most 50 groups per request
    #[serde(default)]
    #[validate(length(max = 50))]
    pub group_ids: Vec<Uuid>,
}

impl PrayerRequestBody {
    fn into_draft(self) -> Result<PrayerRequestDraft, PrayerError> {
        PrayerRequestDraft::new(
            &self.title,
            &self.body,
            self.category,
            self.visibility,
            self.allow_anonymous,
            &self.group_ids,
        )
    }
}

/// Body for recording a prayer; omitted body means a Hail Mary
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayBody {
    pub action_type: PrayerActionType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayResponse {
    pub status: &'static str,
    pub prayed_count: i32,
}

/// Create a prayer request
///
/// **POST /v1/requests**
///
/// Starts `ACTIVE` with a prayed count of zero. `GROUP_ONLY` requests must
/// name at least one group the author actively belongs to.
pub async fn create_request(
    AuthUser(auth): AuthUser,
    State(state): State<PrayersState>,
    ValidatedJson(body): ValidatedJson<PrayerRequestBody>,
) -> Result<(StatusCode, Json<PrayerRequestView>), PrayerError> {
    let draft = body.into_draft()?;
    let created = state.service.create(auth.user_id(), draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// **GET /v1/requests/{id}**
pub async fn get_request(
    AuthUser(auth): AuthUser,
    State(state): State<PrayersState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PrayerRequestView>, PrayerError> {
    let view = state.service.get(auth.user_id(), id).await?;
    Ok(Json(view))
}

/// Replace a prayer request's content and group attachments
///
/// **PATCH /v1/requests/{id}**
///
/// Author only. Status is never changed here.
pub async fn update_request(
    AuthUser(auth): AuthUser,
    State(state): State<PrayersState>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<PrayerRequestBody>,
) -> Result<Json<PrayerRequestView>, PrayerError> {
    let draft = body.into_draft()?;
    let updated = state.service.update(auth.user_id(), id, draft).await?;
    Ok(Json(updated))
}

/// Soft-delete a prayer request
///
/// **DELETE /v1/requests/{id}**
pub async fn delete_request(
    AuthUser(auth): AuthUser,
    State(state): State<PrayersState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PrayerError> {
    state.service.delete(auth.user_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a prayer
///
/// **POST /v1/requests/{id}/pray**
///
/// The same action type on the same request is accepted once per window;
/// repeats answer 429 `PRAYED_RATE_LIMITED`.
pub async fn pray(
    AuthUser(auth): AuthUser,
    State(state): State<PrayersState>,
    Path(id): Path<Uuid>,
    body: Option<Json<PrayBody>>,
) -> Result<Json<PrayResponse>, PrayerError> {
    let action_type = body
        .map(|Json(b)| b.action_type)
        .unwrap_or(PrayerActionType::HailMary);

    let recorded = state.service.pray(auth.user_id(), id, action_type).await?;

    tracing::info!(
        prayer_request_id = %id,
        user_id = %auth.user_id(),
        action_type = %action_type,
        prayed_count = recorded.prayed_count,
        "Prayer recorded"
    );

    Ok(Json(PrayResponse {
        status: "recorded",
        prayed_count: recorded.prayed_count,
    }))
}
