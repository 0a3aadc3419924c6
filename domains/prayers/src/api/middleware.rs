//! Prayers domain state and auth backend integration

use crate::PrayerService;
use axum::extract::FromRef;
use parish_auth::AuthBackend;

pub use parish_auth::{AuthUser, MaybeAuthUser};

/// Application state for the prayers domain
#[derive(Clone)]
pub struct PrayersState {
    pub service: PrayerService,
    pub auth: AuthBackend,
}

impl FromRef<PrayersState> for AuthBackend {
    fn from_ref(state: &PrayersState) -> Self {
        state.auth.clone()
    }
}
