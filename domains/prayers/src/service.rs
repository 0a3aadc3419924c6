//! Prayer request workflows
//!
//! Each write runs in its own transaction; returning early drops the
//! transaction and rolls it back.

use parish_common::{Page, Pagination, RepositoryError};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{PrayerActionType, PrayerRequest, PrayerRequestDraft, Visibility};
use crate::domain::feed::FeedScope;
use crate::domain::state::{PrayerStatusEvent, PrayerStatusMachine};
use crate::domain::view::PrayerRequestView;
use crate::domain::visibility::is_visible_to;
use crate::error::PrayerError;
use crate::repository::{
    attach_groups_tx, count_active_memberships_tx, create_prayer_request_tx,
    increment_prayed_count_tx, is_member_of_attached_group_tx, lock_prayer_request_tx,
    record_prayer_action_tx, replace_group_attachments_tx, soft_delete_prayer_request_tx,
    update_prayer_request_tx, PrayersRepositories,
};

/// Rolling window inside which the same prayer cannot be repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerWindow {
    hours: i32,
}

impl PrayerWindow {
    pub const DEFAULT_HOURS: i32 = 12;

    /// `hours` below one falls back to the default; anything above
    /// `max_hours` is clamped to it.
    pub fn new(hours: i32, max_hours: i32) -> Self {
        let hours = if hours < 1 { Self::DEFAULT_HOURS } else { hours };
        Self {
            hours: hours.min(max_hours.max(1)),
        }
    }

    pub fn hours(&self) -> i32 {
        self.hours
    }
}

impl Default for PrayerWindow {
    fn default() -> Self {
        Self {
            hours: Self::DEFAULT_HOURS,
        }
    }
}

/// Result of a recorded prayer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerRecorded {
    pub prayed_count: i32,
}

#[derive(Clone)]
pub struct PrayerService {
    repos: PrayersRepositories,
    window: PrayerWindow,
}

impl PrayerService {
    pub fn new(repos: PrayersRepositories, window: PrayerWindow) -> Self {
        Self { repos, window }
    }

    pub fn window(&self) -> PrayerWindow {
        self.window
    }

    /// One enriched page of a feed
    pub async fn feed(
        &self,
        scope: FeedScope,
        viewer: Option<Uuid>,
        pagination: &Pagination,
    ) -> Result<Page<PrayerRequestView>, PrayerError> {
        if scope.requires_viewer() && viewer.is_none() {
            return Err(PrayerError::ViewerRequired);
        }

        let total = self.repos.feeds.count(scope, viewer).await?;
        let rows = self
            .repos
            .feeds
            .page(scope, viewer, pagination.limit(), pagination.offset())
            .await?;
        let items = self.repos.enrichment.enrich(rows, viewer).await?;

        Ok(Page::new(items, pagination, total))
    }

    /// Fetch a single request; anything the viewer may not see is `NotFound`
    pub async fn get(&self, viewer: Uuid, id: Uuid) -> Result<PrayerRequestView, PrayerError> {
        let request = self
            .repos
            .prayer_requests
            .get_by_id(id)
            .await?
            .ok_or(PrayerError::NotFound)?;

        let member = if needs_membership_check(&request, viewer) {
            self.repos
                .prayer_requests
                .is_member_of_attached_group(id, viewer)
                .await?
        } else {
            false
        };

        if !is_visible_to(&request, Some(viewer), member) {
            return Err(PrayerError::NotFound);
        }

        self.view_one(request, viewer).await
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        draft: PrayerRequestDraft,
    ) -> Result<PrayerRequestView, PrayerError> {
        let mut tx = self.repos.begin().await?;

        ensure_member_of_all(&mut tx, author_id, &draft.group_ids).await?;
        let created = create_prayer_request_tx(&mut tx, author_id, &draft).await?;
        attach_groups_tx(&mut tx, created.id, &draft.group_ids).await?;

        tx.commit().await?;

        tracing::info!(
            prayer_request_id = %created.id,
            author_id = %author_id,
            visibility = %created.visibility,
            "Prayer request created"
        );

        self.view_one(created, author_id).await
    }

    /// Replace content and group attachments; status is left alone
    pub async fn update(
        &self,
        author_id: Uuid,
        id: Uuid,
        draft: PrayerRequestDraft,
    ) -> Result<PrayerRequestView, PrayerError> {
        let mut tx = self.repos.begin().await?;

        let current = lock_prayer_request_tx(&mut tx, id)
            .await?
            .ok_or(PrayerError::NotFound)?;
        ensure_author(&mut tx, &current, author_id).await?;

        ensure_member_of_all(&mut tx, author_id, &draft.group_ids).await?;
        let updated = update_prayer_request_tx(&mut tx, id, &draft)
            .await
            .map_err(not_found_or)?;
        replace_group_attachments_tx(&mut tx, id, &draft.group_ids).await?;

        tx.commit().await?;

        tracing::info!(prayer_request_id = %id, author_id = %author_id, "Prayer request updated");

        self.view_one(updated, author_id).await
    }

    /// Soft-delete; a second delete is `NotFound`
    pub async fn delete(&self, author_id: Uuid, id: Uuid) -> Result<(), PrayerError> {
        let mut tx = self.repos.begin().await?;

        let current = lock_prayer_request_tx(&mut tx, id)
            .await?
            .ok_or(PrayerError::NotFound)?;
        ensure_author(&mut tx, &current, author_id).await?;

        let next = PrayerStatusMachine::transition(current.status, PrayerStatusEvent::Delete)?;
        soft_delete_prayer_request_tx(&mut tx, id, next)
            .await
            .map_err(not_found_or)?;

        tx.commit().await?;

        tracing::info!(prayer_request_id = %id, author_id = %author_id, "Prayer request deleted");
        Ok(())
    }

    /// Record a prayer against a visible request.
    ///
    /// The request row stays locked until commit, so identical concurrent
    /// attempts succeed exactly once.
    pub async fn pray(
        &self,
        user_id: Uuid,
        id: Uuid,
        action_type: PrayerActionType,
    ) -> Result<PrayerRecorded, PrayerError> {
        let mut tx = self.repos.begin().await?;

        let request = lock_prayer_request_tx(&mut tx, id)
            .await?
            .ok_or(PrayerError::NotFound)?;

        let member = if needs_membership_check(&request, user_id) {
            is_member_of_attached_group_tx(&mut tx, id, user_id).await?
        } else {
            false
        };
        if !is_visible_to(&request, Some(user_id), member) {
            return Err(PrayerError::NotFound);
        }

        let recorded =
            record_prayer_action_tx(&mut tx, user_id, id, action_type, self.window.hours())
                .await?;
        if !recorded {
            tracing::debug!(
                prayer_request_id = %id,
                user_id = %user_id,
                action_type = %action_type,
                "Prayer suppressed inside window"
            );
            return Err(PrayerError::RateLimited);
        }

        let prayed_count = increment_prayed_count_tx(&mut tx, id).await?;
        tx.commit().await?;

        Ok(PrayerRecorded { prayed_count })
    }

    async fn view_one(
        &self,
        request: PrayerRequest,
        viewer: Uuid,
    ) -> Result<PrayerRequestView, PrayerError> {
        let id = request.id;
        self.repos
            .enrichment
            .enrich(vec![request], Some(viewer))
            .await?
            .pop()
            .ok_or_else(|| {
                PrayerError::Repository(RepositoryError::InvalidData(format!(
                    "enrichment dropped prayer request {id}"
                )))
            })
    }
}

/// Only a non-author looking at a live `GROUP_ONLY` request needs the lookup
fn needs_membership_check(request: &PrayerRequest, viewer: Uuid) -> bool {
    request.author_id != viewer
        && !request.is_deleted()
        && request.visibility == Visibility::GroupOnly
}

/// Author-only guard for writes: invisible or deleted requests read as
/// `NotFound`, visible ones owned by someone else as `NotAuthor`.
async fn ensure_author(
    tx: &mut Transaction<'_, Postgres>,
    request: &PrayerRequest,
    user_id: Uuid,
) -> Result<(), PrayerError> {
    if request.is_deleted() {
        return Err(PrayerError::NotFound);
    }
    if request.author_id == user_id {
        return Ok(());
    }

    let member = if needs_membership_check(request, user_id) {
        is_member_of_attached_group_tx(tx, request.id, user_id).await?
    } else {
        false
    };
    if is_visible_to(request, Some(user_id), member) {
        Err(PrayerError::NotAuthor)
    } else {
        Err(PrayerError::NotFound)
    }
}

async fn ensure_member_of_all(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    group_ids: &[Uuid],
) -> Result<(), PrayerError> {
    if group_ids.is_empty() {
        return Ok(());
    }

    let memberships = count_active_memberships_tx(tx, user_id, group_ids).await?;
    if memberships != group_ids.len() as i64 {
        return Err(PrayerError::GroupAccessDenied);
    }
    Ok(())
}

fn not_found_or(err: RepositoryError) -> PrayerError {
    match err {
        RepositoryError::NotFound => PrayerError::NotFound,
        other => PrayerError::Repository(other),
    }
}
