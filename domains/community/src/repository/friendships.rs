//! Friendship repository

use crate::domain::entities::{Friend, FriendRequest};
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Accepted friends on either side of the pair, most recently connected first
    pub async fn list_friends(
        &self,
        user_id: Uuid,
    ) -> std::result::Result<Vec<Friend>, RepositoryError> {
        let friends = sqlx::query_as::<_, Friend>(
            r#"
            SELECT u.id AS user_id, u.username, u.display_name, u.avatar_url,
                   f.updated_at AS connected_at
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_id = $1 THEN f.friend_user_id ELSE f.user_id END
            WHERE f.status = 'ACCEPTED'
              AND (f.user_id = $1 OR f.friend_user_id = $1)
              AND u.deleted_at IS NULL
            ORDER BY f.updated_at DESC, u.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    /// Pending requests addressed to the user, oldest first
    pub async fn list_pending_for(
        &self,
        user_id: Uuid,
    ) -> std::result::Result<Vec<FriendRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, FriendRequest>(
            r#"
            SELECT f.id, f.user_id AS from_user_id, u.username, u.display_name,
                   f.created_at AS requested_at
            FROM friendships f
            JOIN users u ON u.id = f.user_id
            WHERE f.friend_user_id = $1 AND f.status = 'PENDING'
            ORDER BY f.created_at ASC, f.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
