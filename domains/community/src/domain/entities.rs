//! Domain entities for the community domain
//!
//! Users as seen by their owner and by others, groups and their
//! memberships, join requests, and friendships.

use chrono::{DateTime, Utc};
use parish_common::{is_valid_username, normalize_username};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::{
    is_valid_display_name, is_valid_group_description, is_valid_group_name,
};
use crate::error::CommunityError;

/// How users get into a group
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "group_join_policy", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupJoinPolicy {
    /// Joining creates the membership immediately
    Open,
    /// Joining files a join request for an admin to approve
    #[default]
    Request,
    /// Nobody can ask to join
    InviteOnly,
}

/// Role of a member inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRole {
    Member,
    Moderator,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "join_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinRequestStatus::Pending => write!(f, "PENDING"),
            JoinRequestStatus::Approved => write!(f, "APPROVED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friendship_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FriendshipStatus::Pending => write!(f, "PENDING"),
            FriendshipStatus::Accepted => write!(f, "ACCEPTED"),
        }
    }
}

/// The caller's own user row
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Another user as shown in search results
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub join_policy: GroupJoinPolicy,
    pub requires_moderation: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group the caller belongs to, with their role
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub group: Group,
    pub role: GroupRole,
}

/// A search hit, annotated with whether the caller already belongs to it
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupSearchResult {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub group: Group,
    pub is_member: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub status: JoinRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

/// Pending join request with the requester's public identity
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingJoinRequest {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub status: JoinRequestStatus,
    pub requested_at: DateTime<Utc>,
}

/// One row per unordered pair; `user_id` sent the request
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_user_id: Uuid,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepted friend, whichever side sent the request
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub connected_at: DateTime<Utc>,
}

/// Pending request addressed to the caller
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validated input for creating a group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub join_policy: GroupJoinPolicy,
}

impl GroupDraft {
    /// Trim and validate; a missing policy means `REQUEST`
    pub fn new(
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        join_policy: Option<GroupJoinPolicy>,
    ) -> Result<Self, CommunityError> {
        let name = name.trim();
        if !is_valid_group_name(name) {
            return Err(CommunityError::InvalidGroupName);
        }

        let description = description.unwrap_or_default().trim();
        if !is_valid_group_description(description) {
            return Err(CommunityError::InvalidGroupDescription);
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            image_url: non_blank(image_url),
            join_policy: join_policy.unwrap_or_default(),
        })
    }
}

/// Validated profile changes
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// A blank display name keeps `current_display_name`; the username is
    /// normalized before its format is checked.
    pub fn new(
        current_display_name: &str,
        display_name: Option<&str>,
        username: &str,
        avatar_url: Option<&str>,
    ) -> Result<Self, CommunityError> {
        let display_name = match display_name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => current_display_name.trim(),
        };
        if !is_valid_display_name(display_name) {
            return Err(CommunityError::InvalidDisplayName);
        }

        let username = normalize_username(username);
        if !is_valid_username(&username) {
            return Err(CommunityError::InvalidUsername);
        }

        Ok(Self {
            display_name: display_name.to_string(),
            username,
            avatar_url: non_blank(avatar_url),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
