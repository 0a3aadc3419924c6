//! Authorization context for authenticated users

use uuid::Uuid;

use crate::types::AuthIdentity;

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
}

impl AuthContext {
    pub fn new(user: AuthIdentity) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// True when `user_id` is the authenticated caller
    pub fn is_user(&self, user_id: Uuid) -> bool {
        self.user.id == user_id
    }
}
