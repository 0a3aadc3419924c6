//! Enriched prayer request as returned by every read endpoint

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{PrayerActionType, PrayerRequest};

pub const ALL_ACTION_TYPES: [PrayerActionType; 5] = [
    PrayerActionType::HailMary,
    PrayerActionType::OurFather,
    PrayerActionType::GloryBe,
    PrayerActionType::RosaryDecade,
    PrayerActionType::RosaryFull,
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequestView {
    #[serde(flatten)]
    pub request: PrayerRequest,
    pub author_username: Option<String>,
    pub author_display_name: Option<String>,
    pub group_ids: Vec<Uuid>,
    pub group_names: Vec<String>,
    /// Counts across all users, every action type present (zero when unused)
    pub prayer_type_counts: BTreeMap<PrayerActionType, i64>,
    /// Distinct action types the viewer has recorded; empty for anonymous viewers
    pub my_prayer_types: Vec<PrayerActionType>,
}

impl PrayerRequestView {
    pub fn bare(request: PrayerRequest) -> Self {
        Self {
            request,
            author_username: None,
            author_display_name: None,
            group_ids: Vec::new(),
            group_names: Vec::new(),
            prayer_type_counts: ALL_ACTION_TYPES.iter().map(|t| (*t, 0)).collect(),
            my_prayer_types: Vec::new(),
        }
    }
}
