//! Repository implementations for the prayers domain

pub mod enrichment;
pub mod feeds;
pub mod prayer_requests;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use enrichment::EnrichmentRepository;
pub use feeds::FeedRepository;
pub use prayer_requests::PrayerRequestRepository;
pub use transactions::{
    attach_groups_tx, count_active_memberships_tx, create_prayer_request_tx,
    increment_prayed_count_tx, is_member_of_attached_group_tx, lock_prayer_request_tx,
    record_prayer_action_tx, replace_group_attachments_tx, soft_delete_prayer_request_tx,
    update_prayer_request_tx,
};

/// Columns of `prayer_requests` in `PrayerRequest` field order, aliased `pr`
pub(crate) const PRAYER_REQUEST_COLUMNS: &str = "pr.id, pr.author_id, pr.title, pr.body, \
     pr.category, pr.visibility, pr.allow_anonymous, pr.status, pr.prayed_count, \
     pr.created_at, pr.updated_at, pr.deleted_at";

/// Combined repository access for the prayers domain
#[derive(Clone)]
pub struct PrayersRepositories {
    pool: PgPool,
    pub prayer_requests: PrayerRequestRepository,
    pub feeds: FeedRepository,
    pub enrichment: EnrichmentRepository,
}

impl PrayersRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            prayer_requests: PrayerRequestRepository::new(pool.clone()),
            feeds: FeedRepository::new(pool.clone()),
            enrichment: EnrichmentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
