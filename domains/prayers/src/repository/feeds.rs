//! Feed queries
//!
//! Every scope is a single `SELECT` over `prayer_requests` so a request that
//! qualifies through several paths (own, friend, shared group) still appears
//! once. Ordering is newest first with `id` as a tie-breaker, which keeps
//! offset paging stable when timestamps collide.

use crate::domain::entities::PrayerRequest;
use crate::domain::feed::FeedScope;
use crate::repository::PRAYER_REQUEST_COLUMNS;
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

const GROUPS_PREDICATE: &str = r#"(
    pr.status = 'ACTIVE'
    AND pr.visibility <> 'PRIVATE'
    AND EXISTS (
        SELECT 1
        FROM prayer_request_groups prg
        JOIN group_memberships gm ON gm.group_id = prg.group_id
        JOIN groups g ON g.id = prg.group_id
        WHERE prg.prayer_request_id = pr.id
          AND gm.user_id = $1
          AND gm.deleted_at IS NULL
          AND g.deleted_at IS NULL
    )
)"#;

const FRIENDS_PREDICATE: &str = r#"(
    pr.status = 'ACTIVE'
    AND pr.visibility = 'PUBLIC'
    AND pr.author_id IN (
        SELECT CASE WHEN f.user_id = $1 THEN f.friend_user_id ELSE f.user_id END
        FROM friendships f
        WHERE f.status = 'ACCEPTED'
          AND (f.user_id = $1 OR f.friend_user_id = $1)
    )
)"#;

const PUBLIC_PREDICATE: &str = "(pr.status = 'ACTIVE' AND pr.visibility = 'PUBLIC')";

const OWN_PREDICATE: &str = "(pr.author_id = $1 AND pr.status IN ('ACTIVE', 'PENDING_REVIEW'))";

/// Scope filter; every scope except `Public` reads the viewer from `$1`
fn scope_predicate(scope: FeedScope) -> String {
    match scope {
        FeedScope::Public => PUBLIC_PREDICATE.to_string(),
        FeedScope::Groups => GROUPS_PREDICATE.to_string(),
        FeedScope::Friends => FRIENDS_PREDICATE.to_string(),
        FeedScope::Home => {
            format!("({OWN_PREDICATE} OR {FRIENDS_PREDICATE} OR {GROUPS_PREDICATE})")
        }
    }
}

fn page_sql(scope: FeedScope) -> String {
    let first = if scope.requires_viewer() { 2 } else { 1 };
    format!(
        "SELECT {PRAYER_REQUEST_COLUMNS} FROM prayer_requests pr \
         WHERE pr.deleted_at IS NULL AND {predicate} \
         ORDER BY pr.created_at DESC, pr.id DESC \
         LIMIT ${first} OFFSET ${second}",
        predicate = scope_predicate(scope),
        second = first + 1,
    )
}

fn count_sql(scope: FeedScope) -> String {
    format!(
        "SELECT COUNT(*) FROM prayer_requests pr WHERE pr.deleted_at IS NULL AND {}",
        scope_predicate(scope)
    )
}

#[derive(Clone)]
pub struct FeedRepository {
    pool: PgPool,
}

impl FeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of a feed.
    ///
    /// `viewer` is ignored for `Public`; the other scopes return nothing
    /// without one.
    pub async fn page(
        &self,
        scope: FeedScope,
        viewer: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> std::result::Result<Vec<PrayerRequest>, RepositoryError> {
        let sql = page_sql(scope);
        let query = sqlx::query_as::<_, PrayerRequest>(&sql);

        let rows = if scope.requires_viewer() {
            let Some(viewer) = viewer else {
                return Ok(Vec::new());
            };
            query.bind(viewer).bind(limit).bind(offset).fetch_all(&self.pool).await?
        } else {
            query.bind(limit).bind(offset).fetch_all(&self.pool).await?
        };

        Ok(rows)
    }

    /// Exact number of requests in the feed, independent of paging
    pub async fn count(
        &self,
        scope: FeedScope,
        viewer: Option<Uuid>,
    ) -> std::result::Result<i64, RepositoryError> {
        let sql = count_sql(scope);
        let query = sqlx::query_scalar::<_, i64>(&sql);

        let total = if scope.requires_viewer() {
            let Some(viewer) = viewer else {
                return Ok(0);
            };
            query.bind(viewer).fetch_one(&self.pool).await?
        } else {
            query.fetch_one(&self.pool).await?
        };

        Ok(total)
    }
}
