//! Group repository

use crate::domain::entities::{Group, GroupSearchResult, GroupWithRole};
use crate::repository::GROUP_COLUMNS;
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a live group by ID
    pub async fn get_by_id(&self, id: Uuid) -> std::result::Result<Option<Group>, RepositoryError> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM groups g WHERE g.id = $1 AND g.deleted_at IS NULL");
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    /// Live groups the user actively belongs to, newest first
    pub async fn list_for_member(
        &self,
        user_id: Uuid,
    ) -> std::result::Result<Vec<GroupWithRole>, RepositoryError> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS}, gm.role \
             FROM groups g \
             JOIN group_memberships gm ON gm.group_id = g.id \
             WHERE gm.user_id = $1 AND gm.deleted_at IS NULL AND g.deleted_at IS NULL \
             ORDER BY g.created_at DESC, g.id DESC"
        );
        let groups = sqlx::query_as::<_, GroupWithRole>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(groups)
    }

    /// Case-insensitive name substring search; `pattern` must already be
    /// `LIKE`-escaped
    pub async fn search(
        &self,
        viewer: Uuid,
        pattern: &str,
        limit: i64,
    ) -> std::result::Result<Vec<GroupSearchResult>, RepositoryError> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS}, \
                 EXISTS ( \
                     SELECT 1 FROM group_memberships gm \
                     WHERE gm.group_id = g.id AND gm.user_id = $1 AND gm.deleted_at IS NULL \
                 ) AS is_member \
             FROM groups g \
             WHERE g.deleted_at IS NULL AND g.name ILIKE '%' || $2 || '%' \
             ORDER BY g.name ASC, g.id ASC \
             LIMIT $3"
        );
        let groups = sqlx::query_as::<_, GroupSearchResult>(&sql)
            .bind(viewer)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(groups)
    }
}

impl GroupRepository {
    /// Creator of a live group, or an active `ADMIN` member
    pub async fn is_admin(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> std::result::Result<bool, RepositoryError> {
        let admin = sqlx::query_scalar::<_, bool>(GROUP_ADMIN_SQL)
            .bind(group_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(admin)
    }
}

pub(crate) const GROUP_ADMIN_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1 FROM groups g
        WHERE g.id = $1 AND g.deleted_at IS NULL
          AND (
              g.created_by = $2
              OR EXISTS (
                  SELECT 1 FROM group_memberships gm
                  WHERE gm.group_id = g.id
                    AND gm.user_id = $2
                    AND gm.role = 'ADMIN'
                    AND gm.deleted_at IS NULL
              )
          )
    )
"#;
