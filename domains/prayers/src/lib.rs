//! Prayers domain: prayer requests, feeds, visibility, prayer actions

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::feed::FeedScope;
pub use domain::view::PrayerRequestView;
pub use domain::state::{PrayerStatusEvent, PrayerStatusMachine};
pub use domain::visibility::is_visible_to;
pub use error::PrayerError;

// Re-export repository types
pub use repository::{
    create_prayer_request_tx, lock_prayer_request_tx, record_prayer_action_tx,
    replace_group_attachments_tx, soft_delete_prayer_request_tx, update_prayer_request_tx,
    EnrichmentRepository, FeedRepository, PrayerRequestRepository, PrayersRepositories,
};
pub use service::{PrayerRecorded, PrayerService, PrayerWindow};

// Re-export API types
pub use api::routes;
pub use api::PrayersState;
