//! Group and friendship workflows against a real database

mod common;

use parish_community::{
    CommunityError, FriendshipStatus, GroupJoinPolicy, GroupRole, JoinOutcome, ProfileChanges,
};

use crate::common::TestApp;

#[tokio::test]
#[ignore] // Requires database setup
async fn test_creator_becomes_group_admin() {
    let app = TestApp::new().await.unwrap();
    let creator = app.create_user().await.unwrap();

    let group = app
        .create_group(&creator, GroupJoinPolicy::Request)
        .await
        .unwrap();

    let groups = app.community.list_my_groups(creator.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.id, group.id);
    assert_eq!(groups[0].role, GroupRole::Admin);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_open_group_join_is_immediate_and_repeatable() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let joiner = app.create_user().await.unwrap();
    let group = app.create_group(&admin, GroupJoinPolicy::Open).await.unwrap();

    for _ in 0..2 {
        let outcome = app.community.join_group(joiner.id, group.id).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Joined);
    }

    let groups = app.community.list_my_groups(joiner.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].role, GroupRole::Member);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_invite_only_group_refuses_join_without_writing() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let joiner = app.create_user().await.unwrap();
    let group = app
        .create_group(&admin, GroupJoinPolicy::InviteOnly)
        .await
        .unwrap();

    let err = app
        .community
        .join_group(joiner.id, group.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CommunityError::GroupInviteOnly));

    let requests: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM group_join_requests WHERE group_id = $1")
            .bind(group.id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(requests, 0);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_join_request_approval_grants_membership() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let joiner = app.create_user().await.unwrap();
    let group = app
        .create_group(&admin, GroupJoinPolicy::Request)
        .await
        .unwrap();

    let outcome = app.community.join_group(joiner.id, group.id).await.unwrap();
    assert_eq!(outcome, JoinOutcome::Requested);

    // Only admins see the queue
    assert!(matches!(
        app.community.list_join_requests(joiner.id, group.id).await,
        Err(CommunityError::GroupAdminRequired)
    ));

    let pending = app
        .community
        .list_join_requests(admin.id, group.id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, joiner.id);
    assert_eq!(pending[0].username, joiner.username);

    assert!(matches!(
        app.community
            .approve_join_request(joiner.id, group.id, pending[0].id)
            .await,
        Err(CommunityError::GroupAdminRequired)
    ));

    app.community
        .approve_join_request(admin.id, group.id, pending[0].id)
        .await
        .unwrap();

    let groups = app.community.list_my_groups(joiner.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.id, group.id);

    // Approving twice finds nothing pending
    assert!(matches!(
        app.community
            .approve_join_request(admin.id, group.id, pending[0].id)
            .await,
        Err(CommunityError::JoinRequestNotFound)
    ));
    assert!(app
        .community
        .list_join_requests(admin.id, group.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_friend_request_lifecycle() {
    let app = TestApp::new().await.unwrap();
    let alice = app.create_user().await.unwrap();
    let bob = app.create_user().await.unwrap();

    let sent = app
        .community
        .send_friend_request(alice.id, &format!("  @{}  ", bob.username.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(sent.status, FriendshipStatus::Pending);
    assert_eq!(sent.user_id, alice.id);
    assert_eq!(sent.friend_user_id, bob.id);

    // Same pair from either side is a duplicate
    assert!(matches!(
        app.community.send_friend_request(alice.id, &bob.username).await,
        Err(CommunityError::FriendRequestExists)
    ));
    assert!(matches!(
        app.community.send_friend_request(bob.id, &alice.username).await,
        Err(CommunityError::FriendRequestExists)
    ));

    // Only the addressee may accept
    assert!(matches!(
        app.community.accept_friend_request(alice.id, sent.id).await,
        Err(CommunityError::FriendRequestNotFound)
    ));

    let incoming = app.community.list_pending_friend_requests(bob.id).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].from_user_id, alice.id);

    let accepted = app.community.accept_friend_request(bob.id, sent.id).await.unwrap();
    assert_eq!(accepted.status, FriendshipStatus::Accepted);

    let alice_friends = app.community.list_friends(alice.id).await.unwrap();
    let bob_friends = app.community.list_friends(bob.id).await.unwrap();
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(alice_friends[0].user_id, bob.id);
    assert_eq!(bob_friends.len(), 1);
    assert_eq!(bob_friends[0].user_id, alice.id);

    assert!(app
        .community
        .list_pending_friend_requests(bob.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_friend_request_edge_cases() {
    let app = TestApp::new().await.unwrap();
    let alice = app.create_user().await.unwrap();

    assert!(matches!(
        app.community.send_friend_request(alice.id, &alice.username).await,
        Err(CommunityError::CannotFriendSelf)
    ));
    assert!(matches!(
        app.community.send_friend_request(alice.id, "no_such_user_here").await,
        Err(CommunityError::UserNotFound)
    ));
    assert!(matches!(
        app.community.send_friend_request(alice.id, "ab").await,
        Err(CommunityError::InvalidUsername)
    ));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_user_search_skips_self_and_existing_friends() {
    let app = TestApp::new().await.unwrap();
    let viewer = app.create_user().await.unwrap();
    let friend = app.create_user().await.unwrap();
    let stranger = app.create_user().await.unwrap();
    app.befriend(&viewer, &friend).await.unwrap();

    for target in [&viewer, &friend] {
        let hits = app
            .community
            .search_users(viewer.id, &target.username, None)
            .await
            .unwrap();
        assert!(hits.iter().all(|hit| hit.user_id != target.id));
    }

    let hits = app
        .community
        .search_users(viewer.id, &stranger.username, None)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, stranger.id);

    // LIKE wildcards are matched literally
    let hits = app.community.search_users(viewer.id, "%", None).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_group_search_marks_membership() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let other = app.create_user().await.unwrap();
    let group = app.create_group(&admin, GroupJoinPolicy::Open).await.unwrap();

    let hits = app
        .community
        .search_groups(admin.id, &group.name, Some(100))
        .await
        .unwrap();
    let hit = hits.iter().find(|hit| hit.group.id == group.id).unwrap();
    assert!(hit.is_member);

    let hits = app
        .community
        .search_groups(other.id, &group.name.to_lowercase(), None)
        .await
        .unwrap();
    let hit = hits.iter().find(|hit| hit.group.id == group.id).unwrap();
    assert!(!hit.is_member);

    assert!(app
        .community
        .search_groups(other.id, "   ", None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_username_change_and_availability() {
    let app = TestApp::new().await.unwrap();
    let alice = app.create_user().await.unwrap();
    let bob = app.create_user().await.unwrap();

    let taken = app
        .community
        .username_availability(&bob.username, Some(alice.id))
        .await
        .unwrap();
    assert!(!taken.available);

    let own = app
        .community
        .username_availability(&alice.username, Some(alice.id))
        .await
        .unwrap();
    assert!(own.available);

    let err = app
        .community
        .update_profile(
            alice.id,
            ProfileChanges {
                username: &bob.username,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CommunityError::UsernameTaken));

    let fresh = format!("{}_x", alice.username);
    let updated = app
        .community
        .update_profile(
            alice.id,
            ProfileChanges {
                display_name: Some("  Alice Example  "),
                username: &fresh.to_uppercase(),
                avatar_url: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, fresh);
    assert_eq!(updated.display_name, "Alice Example");
}
