//! Transactional free functions for the community domain

use crate::domain::entities::{
    Friendship, Group, GroupDraft, GroupMembership, GroupRole, JoinRequest,
};
use crate::repository::groups::GROUP_ADMIN_SQL;
use parish_common::{is_unique_violation, RepositoryError};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

const MEMBERSHIP_COLUMNS: &str = "id, group_id, user_id, role, created_at, updated_at";
const JOIN_REQUEST_COLUMNS: &str =
    "id, group_id, user_id, status, requested_at, reviewed_at, reviewed_by";
const FRIENDSHIP_COLUMNS: &str = "id, user_id, friend_user_id, status, created_at, updated_at";

/// Insert a group within an existing transaction.
pub async fn create_group_tx(
    transaction: &mut Transaction<'_, Postgres>,
    created_by: Uuid,
    draft: &GroupDraft,
) -> std::result::Result<Group, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO groups (name, description, image_url, join_policy, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, image_url, join_policy, requires_moderation,
                  created_by, created_at, updated_at
        "#,
    )
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(draft.image_url.as_deref())
    .bind(draft.join_policy)
    .bind(created_by)
    .fetch_one(&mut **transaction)
    .await
}

/// Create a membership, or reactivate a soft-deleted one.
///
/// An existing membership keeps its role.
pub async fn upsert_membership_tx(
    transaction: &mut Transaction<'_, Postgres>,
    group_id: Uuid,
    user_id: Uuid,
    role: GroupRole,
) -> std::result::Result<GroupMembership, sqlx::Error> {
    let sql = format!(
        "INSERT INTO group_memberships (group_id, user_id, role) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (group_id, user_id) \
         DO UPDATE SET deleted_at = NULL, updated_at = NOW() \
         RETURNING {MEMBERSHIP_COLUMNS}"
    );
    sqlx::query_as::<_, GroupMembership>(&sql)
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut **transaction)
        .await
}

/// File a pending join request; asking again resets an earlier one.
pub async fn upsert_join_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    group_id: Uuid,
    user_id: Uuid,
) -> std::result::Result<JoinRequest, sqlx::Error> {
    let sql = format!(
        "INSERT INTO group_join_requests (group_id, user_id, status) \
         VALUES ($1, $2, 'PENDING') \
         ON CONFLICT (group_id, user_id) \
         DO UPDATE SET status = 'PENDING', requested_at = NOW(), \
                       reviewed_at = NULL, reviewed_by = NULL \
         RETURNING {JOIN_REQUEST_COLUMNS}"
    );
    sqlx::query_as::<_, JoinRequest>(&sql)
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&mut **transaction)
        .await
}

/// Transactional variant of `GroupRepository::is_admin`
pub async fn is_group_admin_tx(
    transaction: &mut Transaction<'_, Postgres>,
    group_id: Uuid,
    user_id: Uuid,
) -> std::result::Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(GROUP_ADMIN_SQL)
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&mut **transaction)
        .await
}

/// Lock a join request that belongs to `group_id`.
pub async fn lock_join_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<Option<JoinRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {JOIN_REQUEST_COLUMNS} FROM group_join_requests \
         WHERE id = $1 AND group_id = $2 \
         FOR UPDATE"
    );
    sqlx::query_as::<_, JoinRequest>(&sql)
        .bind(request_id)
        .bind(group_id)
        .fetch_optional(&mut **transaction)
        .await
}

/// Mark a pending join request approved.
///
/// Returns `RepositoryError::NotFound` if it is no longer pending.
pub async fn approve_join_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    reviewer_id: Uuid,
) -> std::result::Result<JoinRequest, RepositoryError> {
    let sql = format!(
        "UPDATE group_join_requests \
         SET status = 'APPROVED', reviewed_at = NOW(), reviewed_by = $2 \
         WHERE id = $1 AND status = 'PENDING' \
         RETURNING {JOIN_REQUEST_COLUMNS}"
    );
    let approved = sqlx::query_as::<_, JoinRequest>(&sql)
        .bind(request_id)
        .bind(reviewer_id)
        .fetch_optional(&mut **transaction)
        .await?;

    approved.ok_or(RepositoryError::NotFound)
}

/// The friendship row between two users, in either direction
pub async fn friendship_between_tx(
    transaction: &mut Transaction<'_, Postgres>,
    a: Uuid,
    b: Uuid,
) -> std::result::Result<Option<Friendship>, sqlx::Error> {
    let sql = format!(
        "SELECT {FRIENDSHIP_COLUMNS} FROM friendships \
         WHERE (user_id = $1 AND friend_user_id = $2) \
            OR (user_id = $2 AND friend_user_id = $1)"
    );
    sqlx::query_as::<_, Friendship>(&sql)
        .bind(a)
        .bind(b)
        .fetch_optional(&mut **transaction)
        .await
}

/// Insert a pending friend request.
///
/// The pair index makes a concurrent duplicate in either direction fail
/// with `RepositoryError::AlreadyExists`.
pub async fn create_friend_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> std::result::Result<Friendship, RepositoryError> {
    let sql = format!(
        "INSERT INTO friendships (user_id, friend_user_id, status) \
         VALUES ($1, $2, 'PENDING') \
         RETURNING {FRIENDSHIP_COLUMNS}"
    );
    sqlx::query_as::<_, Friendship>(&sql)
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_one(&mut **transaction)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::AlreadyExists
            } else {
                RepositoryError::Connection(e)
            }
        })
}

/// Lock a friend request addressed to `addressee_id`.
pub async fn lock_friend_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    addressee_id: Uuid,
) -> std::result::Result<Option<Friendship>, sqlx::Error> {
    let sql = format!(
        "SELECT {FRIENDSHIP_COLUMNS} FROM friendships \
         WHERE id = $1 AND friend_user_id = $2 \
         FOR UPDATE"
    );
    sqlx::query_as::<_, Friendship>(&sql)
        .bind(request_id)
        .bind(addressee_id)
        .fetch_optional(&mut **transaction)
        .await
}

/// Accept a pending friend request.
///
/// Returns `RepositoryError::NotFound` if it is no longer pending.
pub async fn accept_friendship_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
) -> std::result::Result<Friendship, RepositoryError> {
    let sql = format!(
        "UPDATE friendships SET status = 'ACCEPTED', updated_at = NOW() \
         WHERE id = $1 AND status = 'PENDING' \
         RETURNING {FRIENDSHIP_COLUMNS}"
    );
    let accepted = sqlx::query_as::<_, Friendship>(&sql)
        .bind(request_id)
        .fetch_optional(&mut **transaction)
        .await?;

    accepted.ok_or(RepositoryError::NotFound)
}
