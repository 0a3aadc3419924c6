//! Domain entities for the prayers domain
//!
//! Prayer requests, their enumerations, and the normalized draft used by
//! create and update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PrayerError;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const BODY_MIN_CHARS: usize = 10;
pub const BODY_MAX_CHARS: usize = 4000;

/// Prayer request category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "prayer_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrayerCategory {
    Health,
    Family,
    Work,
    Grief,
    Thanksgiving,
    Other,
}

/// Who can see a prayer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "prayer_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    GroupOnly,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "PUBLIC"),
            Visibility::GroupOnly => write!(f, "GROUP_ONLY"),
            Visibility::Private => write!(f, "PRIVATE"),
        }
    }
}

/// Prayer request lifecycle status
///
/// `PendingReview` is never produced by new writes; it only exists on
/// legacy rows and is honored by the author's home feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "prayer_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrayerStatus {
    PendingReview,
    Active,
    Closed,
    Archived,
    Removed,
}

impl std::fmt::Display for PrayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrayerStatus::PendingReview => write!(f, "PENDING_REVIEW"),
            PrayerStatus::Active => write!(f, "ACTIVE"),
            PrayerStatus::Closed => write!(f, "CLOSED"),
            PrayerStatus::Archived => write!(f, "ARCHIVED"),
            PrayerStatus::Removed => write!(f, "REMOVED"),
        }
    }
}

/// Kind of prayer recorded against a request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "prayer_action_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrayerActionType {
    HailMary,
    OurFather,
    GloryBe,
    RosaryDecade,
    RosaryFull,
}

impl PrayerActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerActionType::HailMary => "HAIL_MARY",
            PrayerActionType::OurFather => "OUR_FATHER",
            PrayerActionType::GloryBe => "GLORY_BE",
            PrayerActionType::RosaryDecade => "ROSARY_DECADE",
            PrayerActionType::RosaryFull => "ROSARY_FULL",
        }
    }
}

impl std::fmt::Display for PrayerActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prayer request entity
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequest {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub category: PrayerCategory,
    pub visibility: Visibility,
    pub allow_anonymous: bool,
    pub status: PrayerStatus,
    pub prayed_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PrayerRequest {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A single recorded prayer
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrayerAction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prayer_request_id: Uuid,
    pub action_type: PrayerActionType,
    pub created_at: DateTime<Utc>,
}

/// Validated content for creating or updating a prayer request
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerRequestDraft {
    pub title: String,
    pub body: String,
    pub category: PrayerCategory,
    pub visibility: Visibility,
    pub allow_anonymous: bool,
    /// Only populated for `GROUP_ONLY`; deduplicated, input order kept
    pub group_ids: Vec<Uuid>,
}

impl PrayerRequestDraft {
    /// Trim and validate raw input.
    ///
    /// Group ids supplied with `PUBLIC` are discarded so attachments only
    /// ever exist for `GROUP_ONLY` requests.
    pub fn new(
        title: &str,
        body: &str,
        category: PrayerCategory,
        visibility: Visibility,
        allow_anonymous: bool,
        group_ids: &[Uuid],
    ) -> Result<Self, PrayerError> {
        let title = title.trim();
        let body = body.trim();

        let title_len = title.chars().count();
        if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
            return Err(PrayerError::InvalidTitle);
        }

        let body_len = body.chars().count();
        if !(BODY_MIN_CHARS..=BODY_MAX_CHARS).contains(&body_len) {
            return Err(PrayerError::InvalidBody);
        }

        let group_ids = match visibility {
            Visibility::GroupOnly if group_ids.is_empty() => {
                return Err(PrayerError::GroupIdsRequired)
            }
            Visibility::GroupOnly => dedup(group_ids),
            Visibility::Private if !group_ids.is_empty() => {
                return Err(PrayerError::PrivateWithGroups)
            }
            Visibility::Private | Visibility::Public => Vec::new(),
        };

        Ok(Self {
            title: title.to_string(),
            body: body.to_string(),
            category,
            visibility,
            allow_anonymous,
            group_ids,
        })
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
