//! Join request repository

use crate::domain::entities::PendingJoinRequest;
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct JoinRequestRepository {
    pool: PgPool,
}

impl JoinRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pending requests for a group with the requester's identity, oldest first
    pub async fn list_pending(
        &self,
        group_id: Uuid,
    ) -> std::result::Result<Vec<PendingJoinRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, PendingJoinRequest>(
            r#"
            SELECT r.id, r.group_id, r.user_id, u.username, u.display_name,
                   r.status, r.requested_at
            FROM group_join_requests r
            JOIN users u ON u.id = r.user_id
            WHERE r.group_id = $1 AND r.status = 'PENDING'
            ORDER BY r.requested_at ASC, r.id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
