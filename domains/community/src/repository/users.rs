//! User repository: profiles, username lookups, directory search

use crate::domain::entities::{UserProfile, UserSummary};
use parish_common::{is_unique_violation, RepositoryError};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a live user by ID
    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> std::result::Result<Option<UserProfile>, RepositoryError> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, username, display_name, avatar_url, created_at, updated_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Who holds `username`, soft-deleted users included since the
    /// unique constraint still applies to them
    pub async fn username_owner(
        &self,
        username: &str,
    ) -> std::result::Result<Option<Uuid>, RepositoryError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    /// Update display name, username and avatar.
    ///
    /// Returns `RepositoryError::AlreadyExists` when the username belongs to
    /// someone else and `RepositoryError::NotFound` when the user is gone.
    pub async fn update_profile(
        &self,
        id: Uuid,
        display_name: &str,
        username: &str,
        avatar_url: Option<&str>,
    ) -> std::result::Result<UserProfile, RepositoryError> {
        let updated = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users SET
                display_name = $2,
                username = $3,
                avatar_url = $4,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, email, username, display_name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(username)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::AlreadyExists
            } else {
                RepositoryError::Connection(e)
            }
        })?;

        updated.ok_or(RepositoryError::NotFound)
    }

    /// Users matching by username prefix or display-name substring, minus
    /// the caller and anyone already sharing a friendship row with them.
    ///
    /// `pattern` must already be `LIKE`-escaped.
    pub async fn search_for_friendship(
        &self,
        viewer: Uuid,
        pattern: &str,
        limit: i64,
    ) -> std::result::Result<Vec<UserSummary>, RepositoryError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id AS user_id, u.username, u.display_name, u.avatar_url
            FROM users u
            WHERE u.id <> $1
              AND u.deleted_at IS NULL
              AND (
                  u.username ILIKE $2 || '%'
                  OR u.display_name ILIKE '%' || $2 || '%'
              )
              AND NOT EXISTS (
                  SELECT 1
                  FROM friendships f
                  WHERE (f.user_id = $1 AND f.friend_user_id = u.id)
                     OR (f.user_id = u.id AND f.friend_user_id = $1)
              )
            ORDER BY u.display_name ASC, u.username ASC
            LIMIT $3
            "#,
        )
        .bind(viewer)
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
