//! Prayer request repository

use crate::domain::entities::PrayerRequest;
use crate::repository::PRAYER_REQUEST_COLUMNS;
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PrayerRequestRepository {
    pool: PgPool,
}

impl PrayerRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a request by id, soft-deleted rows included.
    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> std::result::Result<Option<PrayerRequest>, RepositoryError> {
        let sql = format!("SELECT {PRAYER_REQUEST_COLUMNS} FROM prayer_requests pr WHERE pr.id = $1");
        let row = sqlx::query_as::<_, PrayerRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Whether the user actively belongs to at least one live group the
    /// request is attached to
    pub async fn is_member_of_attached_group(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> std::result::Result<bool, RepositoryError> {
        let member = sqlx::query_scalar::<_, bool>(ATTACHED_MEMBERSHIP_SQL)
            .bind(request_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(member)
    }
}

pub(crate) const ATTACHED_MEMBERSHIP_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM prayer_request_groups prg
        JOIN group_memberships gm ON gm.group_id = prg.group_id
        JOIN groups g ON g.id = prg.group_id
        WHERE prg.prayer_request_id = $1
          AND gm.user_id = $2
          AND gm.deleted_at IS NULL
          AND g.deleted_at IS NULL
    )
"#;
