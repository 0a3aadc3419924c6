//! Repository implementations for the community domain

pub mod friendships;
pub mod groups;
pub mod join_requests;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use friendships::FriendshipRepository;
pub use groups::GroupRepository;
pub use join_requests::JoinRequestRepository;
pub use transactions::{
    approve_join_request_tx, accept_friendship_tx, create_friend_request_tx, create_group_tx,
    friendship_between_tx, is_group_admin_tx, lock_friend_request_tx, lock_join_request_tx,
    upsert_join_request_tx, upsert_membership_tx,
};
pub use users::UserRepository;

/// Columns of `groups` in `Group` field order, aliased `g`
pub(crate) const GROUP_COLUMNS: &str = "g.id, g.name, g.description, g.image_url, \
     g.join_policy, g.requires_moderation, g.created_by, g.created_at, g.updated_at";

/// Combined repository access for the community domain
#[derive(Clone)]
pub struct CommunityRepositories {
    pool: PgPool,
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub join_requests: JoinRequestRepository,
    pub friendships: FriendshipRepository,
}

impl CommunityRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            join_requests: JoinRequestRepository::new(pool.clone()),
            friendships: FriendshipRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
