//! Community domain state and auth backend integration

use crate::CommunityService;
use axum::extract::FromRef;
use parish_auth::AuthBackend;

pub use parish_auth::{AuthUser, MaybeAuthUser};

/// Application state for the community domain
#[derive(Clone)]
pub struct CommunityState {
    pub service: CommunityService,
    pub auth: AuthBackend,
}

impl FromRef<CommunityState> for AuthBackend {
    fn from_ref(state: &CommunityState) -> Self {
        state.auth.clone()
    }
}
