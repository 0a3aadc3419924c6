//! Community workflows: profile, groups, join requests, friendships, search

use parish_common::{is_valid_username, normalize_username, RepositoryError};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    Friend, FriendRequest, Friendship, Group, GroupDraft, GroupJoinPolicy, GroupRole,
    GroupSearchResult, GroupWithRole, PendingJoinRequest, ProfileUpdate, UserProfile,
    UserSummary, UsernameAvailability,
};
use crate::domain::state::{
    FriendshipEvent, FriendshipStateMachine, JoinRequestEvent, JoinRequestStateMachine,
};
use crate::domain::validation::{escape_like, search_limit, FRIEND_USERNAME_MIN_CHARS};
use crate::error::CommunityError;
use crate::repository::{
    accept_friendship_tx, approve_join_request_tx, create_friend_request_tx, create_group_tx,
    friendship_between_tx, is_group_admin_tx, lock_friend_request_tx, lock_join_request_tx,
    upsert_join_request_tx, upsert_membership_tx, CommunityRepositories,
};

/// What happened when a user asked to join a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinOutcome {
    /// Open group: membership created or reactivated
    Joined,
    /// Request group: pending join request filed
    Requested,
}

/// Raw profile changes as received from the client
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges<'a> {
    pub display_name: Option<&'a str>,
    pub username: &'a str,
    pub avatar_url: Option<&'a str>,
}

#[derive(Clone)]
pub struct CommunityService {
    repos: CommunityRepositories,
}

impl CommunityService {
    pub fn new(repos: CommunityRepositories) -> Self {
        Self { repos }
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, CommunityError> {
        self.repos
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(CommunityError::UserNotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges<'_>,
    ) -> Result<UserProfile, CommunityError> {
        let current = self.get_profile(user_id).await?;
        let update = ProfileUpdate::new(
            &current.display_name,
            changes.display_name,
            changes.username,
            changes.avatar_url,
        )?;

        let updated = self
            .repos
            .users
            .update_profile(
                user_id,
                &update.display_name,
                &update.username,
                update.avatar_url.as_deref(),
            )
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => CommunityError::UsernameTaken,
                RepositoryError::NotFound => CommunityError::UserNotFound,
                other => CommunityError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, username = %updated.username, "Profile updated");
        Ok(updated)
    }

    /// `viewer` holding the name already counts as available
    pub async fn username_availability(
        &self,
        raw: &str,
        viewer: Option<Uuid>,
    ) -> Result<UsernameAvailability, CommunityError> {
        let username = normalize_username(raw);
        if !is_valid_username(&username) {
            return Ok(UsernameAvailability {
                username,
                available: false,
                reason: Some(
                    "use 3-30 lowercase letters, digits or underscores".to_string(),
                ),
            });
        }

        let owner = self.repos.users.username_owner(&username).await?;
        let available = match owner {
            None => true,
            Some(owner) => Some(owner) == viewer,
        };

        Ok(UsernameAvailability {
            username,
            available,
            reason: (!available).then(|| "username already in use".to_string()),
        })
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub async fn list_my_groups(&self, user_id: Uuid) -> Result<Vec<GroupWithRole>, CommunityError> {
        Ok(self.repos.groups.list_for_member(user_id).await?)
    }

    /// Empty or blank query yields no results
    pub async fn search_groups(
        &self,
        viewer: Uuid,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<GroupSearchResult>, CommunityError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .repos
            .groups
            .search(viewer, &escape_like(query), search_limit(limit))
            .await?)
    }

    /// Create a group with its creator as `ADMIN`
    pub async fn create_group(
        &self,
        user_id: Uuid,
        draft: GroupDraft,
    ) -> Result<Group, CommunityError> {
        let mut tx = self.repos.begin().await?;

        let group = create_group_tx(&mut tx, user_id, &draft).await?;
        upsert_membership_tx(&mut tx, group.id, user_id, GroupRole::Admin).await?;

        tx.commit().await?;

        tracing::info!(
            group_id = %group.id,
            created_by = %user_id,
            join_policy = ?group.join_policy,
            "Group created"
        );
        Ok(group)
    }

    pub async fn join_group(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<JoinOutcome, CommunityError> {
        let group = self
            .repos
            .groups
            .get_by_id(group_id)
            .await?
            .ok_or(CommunityError::GroupNotFound)?;

        match group.join_policy {
            GroupJoinPolicy::InviteOnly => Err(CommunityError::GroupInviteOnly),
            GroupJoinPolicy::Open => {
                let mut tx = self.repos.begin().await?;
                upsert_membership_tx(&mut tx, group_id, user_id, GroupRole::Member).await?;
                tx.commit().await?;

                tracing::info!(group_id = %group_id, user_id = %user_id, "Joined open group");
                Ok(JoinOutcome::Joined)
            }
            GroupJoinPolicy::Request => {
                let mut tx = self.repos.begin().await?;
                let request = upsert_join_request_tx(&mut tx, group_id, user_id).await?;
                tx.commit().await?;

                tracing::info!(
                    group_id = %group_id,
                    user_id = %user_id,
                    join_request_id = %request.id,
                    "Join request filed"
                );
                Ok(JoinOutcome::Requested)
            }
        }
    }

    pub async fn list_join_requests(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
    ) -> Result<Vec<PendingJoinRequest>, CommunityError> {
        if !self.repos.groups.is_admin(group_id, actor_id).await? {
            return Err(CommunityError::GroupAdminRequired);
        }

        Ok(self.repos.join_requests.list_pending(group_id).await?)
    }

    /// Approve a pending request and make the requester a member, atomically
    pub async fn approve_join_request(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), CommunityError> {
        let mut tx = self.repos.begin().await?;

        if !is_group_admin_tx(&mut tx, group_id, actor_id).await? {
            return Err(CommunityError::GroupAdminRequired);
        }

        let request = lock_join_request_tx(&mut tx, request_id, group_id)
            .await?
            .ok_or(CommunityError::JoinRequestNotFound)?;
        JoinRequestStateMachine::transition(request.status, JoinRequestEvent::Approve)
            .map_err(|_| CommunityError::JoinRequestNotFound)?;

        let approved = approve_join_request_tx(&mut tx, request_id, actor_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CommunityError::JoinRequestNotFound,
                other => CommunityError::Repository(other),
            })?;
        upsert_membership_tx(&mut tx, group_id, approved.user_id, GroupRole::Member).await?;

        tx.commit().await?;

        tracing::info!(
            group_id = %group_id,
            join_request_id = %request_id,
            reviewer_id = %actor_id,
            member_id = %approved.user_id,
            "Join request approved"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Friendships
    // ------------------------------------------------------------------

    pub async fn send_friend_request(
        &self,
        from_user_id: Uuid,
        target_username: &str,
    ) -> Result<Friendship, CommunityError> {
        let username = normalize_username(target_username);
        if username.chars().count() < FRIEND_USERNAME_MIN_CHARS {
            return Err(CommunityError::InvalidUsername);
        }

        let target = self
            .repos
            .users
            .username_owner(&username)
            .await?
            .ok_or(CommunityError::UserNotFound)?;
        let target = self
            .repos
            .users
            .get_by_id(target)
            .await?
            .ok_or(CommunityError::UserNotFound)?;

        if target.id == from_user_id {
            return Err(CommunityError::CannotFriendSelf);
        }

        let mut tx = self.repos.begin().await?;

        if friendship_between_tx(&mut tx, from_user_id, target.id)
            .await?
            .is_some()
        {
            return Err(CommunityError::FriendRequestExists);
        }

        let request = create_friend_request_tx(&mut tx, from_user_id, target.id)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => CommunityError::FriendRequestExists,
                other => CommunityError::Repository(other),
            })?;

        tx.commit().await?;

        tracing::info!(
            friendship_id = %request.id,
            from_user_id = %from_user_id,
            to_user_id = %target.id,
            "Friend request sent"
        );
        Ok(request)
    }

    /// Only the addressed user can accept, and only while pending
    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<Friendship, CommunityError> {
        let mut tx = self.repos.begin().await?;

        let request = lock_friend_request_tx(&mut tx, request_id, user_id)
            .await?
            .ok_or(CommunityError::FriendRequestNotFound)?;
        FriendshipStateMachine::transition(request.status, FriendshipEvent::Accept)
            .map_err(|_| CommunityError::FriendRequestNotFound)?;

        let accepted = accept_friendship_tx(&mut tx, request_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CommunityError::FriendRequestNotFound,
                other => CommunityError::Repository(other),
            })?;

        tx.commit().await?;

        tracing::info!(friendship_id = %request_id, user_id = %user_id, "Friend request accepted");
        Ok(accepted)
    }

    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<Friend>, CommunityError> {
        Ok(self.repos.friendships.list_friends(user_id).await?)
    }

    pub async fn list_pending_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequest>, CommunityError> {
        Ok(self.repos.friendships.list_pending_for(user_id).await?)
    }

    /// Users the caller could send a friend request to
    pub async fn search_users(
        &self,
        viewer: Uuid,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<UserSummary>, CommunityError> {
        let query = normalize_username(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .repos
            .users
            .search_for_friendship(viewer, &escape_like(&query), search_limit(limit))
            .await?)
    }
}
