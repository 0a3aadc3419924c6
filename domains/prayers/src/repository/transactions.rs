//! Transactional free functions for the prayers domain

use crate::domain::entities::{PrayerActionType, PrayerRequest, PrayerRequestDraft, PrayerStatus};
use crate::repository::prayer_requests::ATTACHED_MEMBERSHIP_SQL;
use crate::repository::PRAYER_REQUEST_COLUMNS;
use parish_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

const RETURNING_COLUMNS: &str = "id, author_id, title, body, category, visibility, \
     allow_anonymous, status, prayed_count, created_at, updated_at, deleted_at";

/// Insert a new `ACTIVE` request within an existing transaction.
pub async fn create_prayer_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    author_id: Uuid,
    draft: &PrayerRequestDraft,
) -> std::result::Result<PrayerRequest, sqlx::Error> {
    let sql = format!(
        "INSERT INTO prayer_requests \
             (author_id, title, body, category, visibility, allow_anonymous, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {RETURNING_COLUMNS}"
    );
    let created = sqlx::query_as::<_, PrayerRequest>(&sql)
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(draft.category)
        .bind(draft.visibility)
        .bind(draft.allow_anonymous)
        .bind(PrayerStatus::Active)
        .fetch_one(&mut **transaction)
        .await?;
    Ok(created)
}

/// Overwrite the mutable content of a request within an existing transaction.
pub async fn update_prayer_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    id: Uuid,
    draft: &PrayerRequestDraft,
) -> std::result::Result<PrayerRequest, RepositoryError> {
    let sql = format!(
        "UPDATE prayer_requests SET \
             title = $2, body = $3, category = $4, visibility = $5, \
             allow_anonymous = $6, updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING {RETURNING_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, PrayerRequest>(&sql)
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(draft.category)
        .bind(draft.visibility)
        .bind(draft.allow_anonymous)
        .fetch_optional(&mut **transaction)
        .await?;

    updated.ok_or(RepositoryError::NotFound)
}

/// Lock a request row for the rest of the transaction.
///
/// Soft-deleted rows are returned too; callers decide what that means.
pub async fn lock_prayer_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> std::result::Result<Option<PrayerRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {PRAYER_REQUEST_COLUMNS} FROM prayer_requests pr WHERE pr.id = $1 FOR UPDATE"
    );
    sqlx::query_as::<_, PrayerRequest>(&sql)
        .bind(id)
        .fetch_optional(&mut **transaction)
        .await
}

/// Count how many of `group_ids` the user actively belongs to (live groups only).
pub async fn count_active_memberships_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    group_ids: &[Uuid],
) -> std::result::Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT gm.group_id)
        FROM group_memberships gm
        JOIN groups g ON g.id = gm.group_id
        WHERE gm.user_id = $1
          AND gm.group_id = ANY($2)
          AND gm.deleted_at IS NULL
          AND g.deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .bind(group_ids)
    .fetch_one(&mut **transaction)
    .await
}

/// Transactional variant of `PrayerRequestRepository::is_member_of_attached_group`
pub async fn is_member_of_attached_group_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    user_id: Uuid,
) -> std::result::Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(ATTACHED_MEMBERSHIP_SQL)
        .bind(request_id)
        .bind(user_id)
        .fetch_one(&mut **transaction)
        .await
}

/// Attach a request to groups within an existing transaction.
pub async fn attach_groups_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    group_ids: &[Uuid],
) -> std::result::Result<(), sqlx::Error> {
    if group_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO prayer_request_groups (prayer_request_id, group_id)
        SELECT $1, group_id FROM UNNEST($2::uuid[]) AS t(group_id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(request_id)
    .bind(group_ids)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

/// Replace every attachment of a request within an existing transaction.
///
/// An empty `group_ids` leaves the request with no attachments.
pub async fn replace_group_attachments_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    group_ids: &[Uuid],
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM prayer_request_groups WHERE prayer_request_id = $1")
        .bind(request_id)
        .execute(&mut **transaction)
        .await?;

    attach_groups_tx(transaction, request_id, group_ids).await
}

/// Soft-delete a request, moving it to `status`.
///
/// Returns `RepositoryError::NotFound` if the request is missing or already
/// deleted.
pub async fn soft_delete_prayer_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: PrayerStatus,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE prayer_requests
        SET status = $2, deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(status)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Record a prayer unless the same user recorded the same action type on the
/// same request inside the trailing window.
///
/// Returns `false` when the window check suppressed the insert. Callers hold
/// the request row lock, so two concurrent attempts serialize here and the
/// second one sees the first's row.
pub async fn record_prayer_action_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    request_id: Uuid,
    action_type: PrayerActionType,
    window_hours: i32,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO prayer_actions (user_id, prayer_request_id, action_type)
        SELECT $1, $2, $3
        WHERE NOT EXISTS (
            SELECT 1
            FROM prayer_actions
            WHERE user_id = $1
              AND prayer_request_id = $2
              AND action_type = $3
              AND created_at > NOW() - make_interval(hours => $4)
        )
        "#,
    )
    .bind(user_id)
    .bind(request_id)
    .bind(action_type)
    .bind(window_hours)
    .execute(&mut **transaction)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Bump the denormalized counter, returning the new value.
pub async fn increment_prayed_count_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
) -> std::result::Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE prayer_requests
        SET prayed_count = prayed_count + 1, updated_at = NOW()
        WHERE id = $1
        RETURNING prayed_count
        "#,
    )
    .bind(request_id)
    .fetch_one(&mut **transaction)
    .await
}
