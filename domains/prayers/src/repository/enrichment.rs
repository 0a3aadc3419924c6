//! Batched enrichment of prayer requests for read responses
//!
//! Four queries per page regardless of its size: authors, group attachments,
//! per-type action counts, and the viewer's own action types.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{PrayerActionType, PrayerRequest};
use crate::domain::view::PrayerRequestView;
use parish_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupAttachmentRow {
    pub prayer_request_id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionCountRow {
    pub prayer_request_id: Uuid,
    pub action_type: PrayerActionType,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ViewerActionRow {
    pub prayer_request_id: Uuid,
    pub action_type: PrayerActionType,
}

#[derive(Clone)]
pub struct EnrichmentRepository {
    pool: PgPool,
}

impl EnrichmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enrich requests in input order.
    ///
    /// `viewer` of `None` yields empty `my_prayer_types` everywhere.
    pub async fn enrich(
        &self,
        requests: Vec<PrayerRequest>,
        viewer: Option<Uuid>,
    ) -> std::result::Result<Vec<PrayerRequestView>, RepositoryError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let request_ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        let author_ids: Vec<Uuid> = requests
            .iter()
            .map(|r| r.author_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let authors = self.authors(&author_ids).await?;
        let groups = self.group_attachments(&request_ids).await?;
        let counts = self.action_counts(&request_ids).await?;
        let mine = match viewer {
            Some(viewer) => self.viewer_actions(&request_ids, viewer).await?,
            None => Vec::new(),
        };

        Ok(assemble(requests, authors, groups, counts, mine))
    }

    async fn authors(&self, ids: &[Uuid]) -> std::result::Result<Vec<AuthorRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, username, display_name FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Attachments to live groups, in group name order
    async fn group_attachments(
        &self,
        request_ids: &[Uuid],
    ) -> std::result::Result<Vec<GroupAttachmentRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, GroupAttachmentRow>(
            r#"
            SELECT prg.prayer_request_id, g.id AS group_id, g.name AS group_name
            FROM prayer_request_groups prg
            JOIN groups g ON g.id = prg.group_id
            WHERE prg.prayer_request_id = ANY($1)
              AND g.deleted_at IS NULL
            ORDER BY g.name ASC, g.id ASC
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn action_counts(
        &self,
        request_ids: &[Uuid],
    ) -> std::result::Result<Vec<ActionCountRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActionCountRow>(
            r#"
            SELECT prayer_request_id, action_type, COUNT(*) AS count
            FROM prayer_actions
            WHERE prayer_request_id = ANY($1)
            GROUP BY prayer_request_id, action_type
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn viewer_actions(
        &self,
        request_ids: &[Uuid],
        viewer: Uuid,
    ) -> std::result::Result<Vec<ViewerActionRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ViewerActionRow>(
            r#"
            SELECT DISTINCT prayer_request_id, action_type
            FROM prayer_actions
            WHERE prayer_request_id = ANY($1)
              AND user_id = $2
            "#,
        )
        .bind(request_ids)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Join the batched rows back onto their requests
pub(crate) fn assemble(
    requests: Vec<PrayerRequest>,
    authors: Vec<AuthorRow>,
    groups: Vec<GroupAttachmentRow>,
    counts: Vec<ActionCountRow>,
    mine: Vec<ViewerActionRow>,
) -> Vec<PrayerRequestView> {
    let authors: HashMap<Uuid, AuthorRow> = authors.into_iter().map(|a| (a.id, a)).collect();

    let mut views: Vec<PrayerRequestView> = requests
        .into_iter()
        .map(|request| {
            let author = authors.get(&request.author_id);
            let mut view = PrayerRequestView::bare(request);
            view.author_username = author.map(|a| a.username.clone());
            view.author_display_name = author.map(|a| a.display_name.clone());
            view
        })
        .collect();

    let index: HashMap<Uuid, usize> = views
        .iter()
        .enumerate()
        .map(|(i, v)| (v.request.id, i))
        .collect();

    for row in groups {
        if let Some(&i) = index.get(&row.prayer_request_id) {
            views[i].group_ids.push(row.group_id);
            views[i].group_names.push(row.group_name);
        }
    }

    for row in counts {
        if let Some(&i) = index.get(&row.prayer_request_id) {
            views[i].prayer_type_counts.insert(row.action_type, row.count);
        }
    }

    let mut mine_by_request: HashMap<Uuid, BTreeSet<PrayerActionType>> = HashMap::new();
    for row in mine {
        mine_by_request
            .entry(row.prayer_request_id)
            .or_default()
            .insert(row.action_type);
    }
    for (request_id, types) in mine_by_request {
        if let Some(&i) = index.get(&request_id) {
            views[i].my_prayer_types = types.into_iter().collect();
        }
    }

    views
}
