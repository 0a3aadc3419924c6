//! Prayer request workflows against a real database
//!
//! Run with `cargo test -p parish-integration-tests -- --ignored` once
//! `TEST_DATABASE_URL` points at a disposable Postgres.

mod common;

use parish_common::Pagination;
use parish_prayers::{
    FeedScope, PrayerActionType, PrayerCategory, PrayerError, PrayerRequestDraft, PrayerStatus,
    Visibility,
};

use crate::common::TestApp;

#[tokio::test]
#[ignore] // Requires database setup
async fn test_create_public_request_starts_active_with_zero_prayers() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();

    let title = "Healing for my grandmother";
    assert_eq!(title.chars().count(), 26);
    let draft = PrayerRequestDraft::new(
        title,
        "She is in surgery",
        PrayerCategory::Health,
        Visibility::Public,
        false,
        &[],
    )
    .unwrap();

    let created = app.prayers.create(author.id, draft).await.unwrap();

    assert_eq!(created.request.status, PrayerStatus::Active);
    assert_eq!(created.request.prayed_count, 0);
    assert_eq!(created.request.author_id, author.id);
    assert_eq!(created.author_username.as_deref(), Some(author.username.as_str()));
    assert!(created.group_ids.is_empty());
    assert!(created.my_prayer_types.is_empty());
    assert!(created.prayer_type_counts.values().all(|count| *count == 0));
}

#[test]
fn test_group_only_without_groups_is_rejected_before_storage() {
    let err = PrayerRequestDraft::new(
        "Please pray for our parish",
        "We need strength for the coming weeks.",
        PrayerCategory::Other,
        Visibility::GroupOnly,
        false,
        &[],
    )
    .unwrap_err();

    assert!(matches!(err, PrayerError::GroupIdsRequired));
    assert_eq!(err.to_string(), "groupIds required for GROUP_ONLY");
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_posting_to_foreign_group_is_denied() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let outsider = app.create_user().await.unwrap();
    let group = app
        .create_group(&admin, parish_community::GroupJoinPolicy::Open)
        .await
        .unwrap();

    let err = app
        .post_request(&outsider, Visibility::GroupOnly, &[group.id])
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PrayerError>(),
        Some(PrayerError::GroupAccessDenied)
    ));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_private_request_is_visible_to_author_only() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let friend = app.create_user().await.unwrap();
    app.befriend(&author, &friend).await.unwrap();

    let request = app
        .post_request(&author, Visibility::Private, &[])
        .await
        .unwrap();

    let own = app.prayers.get(author.id, request.request.id).await.unwrap();
    assert_eq!(own.request.id, request.request.id);

    let err = app
        .prayers
        .get(friend.id, request.request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PrayerError::NotFound));

    let err = app
        .prayers
        .pray(friend.id, request.request.id, PrayerActionType::HailMary)
        .await
        .unwrap_err();
    assert!(matches!(err, PrayerError::NotFound));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_group_only_request_requires_membership() {
    let app = TestApp::new().await.unwrap();
    let admin = app.create_user().await.unwrap();
    let member = app.create_user().await.unwrap();
    let outsider = app.create_user().await.unwrap();
    let group = app
        .create_group(&admin, parish_community::GroupJoinPolicy::Request)
        .await
        .unwrap();
    app.add_member(group.id, &member).await.unwrap();

    let request = app
        .post_request(&admin, Visibility::GroupOnly, &[group.id])
        .await
        .unwrap();
    assert_eq!(request.group_ids, vec![group.id]);
    assert_eq!(request.group_names, vec![group.name.clone()]);

    assert!(app.prayers.get(member.id, request.request.id).await.is_ok());
    assert!(matches!(
        app.prayers.get(outsider.id, request.request.id).await,
        Err(PrayerError::NotFound)
    ));

    let page = app
        .prayers
        .feed(FeedScope::Groups, Some(member.id), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items[0].request.id, request.request.id);

    let page = app
        .prayers
        .feed(FeedScope::Groups, Some(outsider.id), &Pagination::default())
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_praying_twice_inside_window_is_rate_limited() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let neighbour = app.create_user().await.unwrap();
    let request = app
        .post_request(&author, Visibility::Public, &[])
        .await
        .unwrap();
    let id = request.request.id;

    let first = app
        .prayers
        .pray(neighbour.id, id, PrayerActionType::OurFather)
        .await
        .unwrap();
    assert_eq!(first.prayed_count, 1);

    let second = app
        .prayers
        .pray(neighbour.id, id, PrayerActionType::OurFather)
        .await;
    assert!(matches!(second, Err(PrayerError::RateLimited)));

    // A different prayer type has its own window
    let other = app
        .prayers
        .pray(neighbour.id, id, PrayerActionType::GloryBe)
        .await
        .unwrap();
    assert_eq!(other.prayed_count, 2);

    assert_eq!(app.prayed_count(id).await.unwrap(), 2);
    assert_eq!(app.action_count(id, &neighbour).await.unwrap(), 2);

    let view = app.prayers.get(neighbour.id, id).await.unwrap();
    assert_eq!(view.prayer_type_counts[&PrayerActionType::OurFather], 1);
    assert_eq!(view.prayer_type_counts[&PrayerActionType::GloryBe], 1);
    assert_eq!(view.prayer_type_counts[&PrayerActionType::HailMary], 0);
    assert_eq!(
        view.my_prayer_types,
        vec![PrayerActionType::OurFather, PrayerActionType::GloryBe]
    );
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_recorded_prayer_touches_updated_at() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let neighbour = app.create_user().await.unwrap();
    let request = app
        .post_request(&author, Visibility::Public, &[])
        .await
        .unwrap();
    let id = request.request.id;

    app.prayers
        .pray(neighbour.id, id, PrayerActionType::RosaryDecade)
        .await
        .unwrap();

    let view = app.prayers.get(author.id, id).await.unwrap();
    assert_eq!(view.request.prayed_count, 1);
    assert!(view.request.updated_at > request.request.updated_at);
}

#[test_log::test(tokio::test)]
#[ignore] // Requires database setup
async fn test_concurrent_identical_prayers_record_once() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let neighbour = app.create_user().await.unwrap();
    let request = app
        .post_request(&author, Visibility::Public, &[])
        .await
        .unwrap();
    let id = request.request.id;

    let attempts = (0..8).map(|_| {
        let prayers = app.prayers.clone();
        let user_id = neighbour.id;
        tokio::spawn(async move { prayers.pray(user_id, id, PrayerActionType::HailMary).await })
    });

    let mut recorded = 0;
    let mut limited = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.unwrap() {
            Ok(_) => recorded += 1,
            Err(PrayerError::RateLimited) => limited += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(recorded, 1);
    assert_eq!(limited, 7);
    assert_eq!(app.prayed_count(id).await.unwrap(), 1);
    assert_eq!(app.action_count(id, &neighbour).await.unwrap(), 1);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_only_author_can_update_or_delete() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let stranger = app.create_user().await.unwrap();
    let request = app
        .post_request(&author, Visibility::Public, &[])
        .await
        .unwrap();
    let id = request.request.id;

    let draft = PrayerRequestDraft::new(
        "Updated: thanks for praying",
        "Surgery went well, recovery is next.",
        PrayerCategory::Thanksgiving,
        Visibility::Public,
        true,
        &[],
    )
    .unwrap();

    let err = app
        .prayers
        .update(stranger.id, id, draft.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, PrayerError::NotAuthor));
    assert!(matches!(
        app.prayers.delete(stranger.id, id).await,
        Err(PrayerError::NotAuthor)
    ));

    let updated = app.prayers.update(author.id, id, draft).await.unwrap();
    assert_eq!(updated.request.title, "Updated: thanks for praying");
    assert_eq!(updated.request.category, PrayerCategory::Thanksgiving);
    assert!(updated.request.allow_anonymous);
    assert_eq!(updated.request.status, PrayerStatus::Active);

    app.prayers.delete(author.id, id).await.unwrap();
    assert!(matches!(
        app.prayers.delete(author.id, id).await,
        Err(PrayerError::NotFound)
    ));
    assert!(matches!(
        app.prayers.get(author.id, id).await,
        Err(PrayerError::NotFound)
    ));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_home_feed_lists_each_request_once() {
    let app = TestApp::new().await.unwrap();
    let viewer = app.create_user().await.unwrap();
    let friend = app.create_user().await.unwrap();
    app.befriend(&viewer, &friend).await.unwrap();

    let group = app
        .create_group(&viewer, parish_community::GroupJoinPolicy::Open)
        .await
        .unwrap();
    app.add_member(group.id, &friend).await.unwrap();

    // Matches both the own-requests and the group branches
    let own_in_group = app
        .post_request(&viewer, Visibility::GroupOnly, &[group.id])
        .await
        .unwrap();
    let friend_in_group = app
        .post_request(&friend, Visibility::GroupOnly, &[group.id])
        .await
        .unwrap();
    let friend_public = app
        .post_request(&friend, Visibility::Public, &[])
        .await
        .unwrap();
    let hidden = app
        .post_request(&friend, Visibility::Private, &[])
        .await
        .unwrap();

    let page = app
        .prayers
        .feed(FeedScope::Home, Some(viewer.id), &Pagination::default())
        .await
        .unwrap();

    let ids: Vec<_> = page.items.iter().map(|view| view.request.id).collect();
    assert_eq!(
        ids,
        vec![
            friend_public.request.id,
            friend_in_group.request.id,
            own_in_group.request.id,
        ]
    );
    assert_eq!(page.pagination.total, 3);
    assert!(!ids.contains(&hidden.request.id));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_groups_feed_lists_request_in_two_shared_groups_once() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let viewer = app.create_user().await.unwrap();

    let mut group_ids = Vec::new();
    for _ in 0..2 {
        let group = app
            .create_group(&author, parish_community::GroupJoinPolicy::Open)
            .await
            .unwrap();
        app.add_member(group.id, &viewer).await.unwrap();
        group_ids.push(group.id);
    }

    let request = app
        .post_request(&author, Visibility::GroupOnly, &group_ids)
        .await
        .unwrap();
    assert_eq!(request.group_ids.len(), 2);

    let page = app
        .prayers
        .feed(FeedScope::Groups, Some(viewer.id), &Pagination::default())
        .await
        .unwrap();

    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].request.id, request.request.id);
    assert_eq!(page.items[0].group_ids.len(), 2);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_update_with_foreign_group_keeps_original_attachments() {
    let app = TestApp::new().await.unwrap();
    let author = app.create_user().await.unwrap();
    let stranger = app.create_user().await.unwrap();

    let first = app
        .create_group(&author, parish_community::GroupJoinPolicy::Open)
        .await
        .unwrap();
    let second = app
        .create_group(&author, parish_community::GroupJoinPolicy::Open)
        .await
        .unwrap();
    let foreign = app
        .create_group(&stranger, parish_community::GroupJoinPolicy::Open)
        .await
        .unwrap();

    let request = app
        .post_request(&author, Visibility::GroupOnly, &[first.id, second.id])
        .await
        .unwrap();
    let id = request.request.id;

    let draft = |group_ids: &[uuid::Uuid]| {
        PrayerRequestDraft::new(
            "Please pray for my family",
            "An update after a long week together.",
            PrayerCategory::Family,
            Visibility::GroupOnly,
            false,
            group_ids,
        )
        .unwrap()
    };

    let err = app
        .prayers
        .update(author.id, id, draft(&[second.id, foreign.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, PrayerError::GroupAccessDenied));

    let unchanged = app.prayers.get(author.id, id).await.unwrap();
    let mut attached = unchanged.group_ids.clone();
    attached.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(attached, expected);
    assert_eq!(unchanged.request.body, request.request.body);

    // A permitted update replaces the set wholesale
    let updated = app
        .prayers
        .update(author.id, id, draft(&[second.id]))
        .await
        .unwrap();
    assert_eq!(updated.group_ids, vec![second.id]);
    assert_eq!(updated.request.body, "An update after a long week together.");
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_friends_feed_pages_past_the_end_are_empty() {
    let app = TestApp::new().await.unwrap();
    let viewer = app.create_user().await.unwrap();
    let friend = app.create_user().await.unwrap();
    app.befriend(&friend, &viewer).await.unwrap();

    for _ in 0..3 {
        app.post_request(&friend, Visibility::Public, &[])
            .await
            .unwrap();
    }

    let first = app
        .prayers
        .feed(FeedScope::Friends, Some(viewer.id), &Pagination::new(0, 2))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.pagination.total, 3);
    assert_eq!(first.pagination.total_pages, 2);
    assert!(first.items[0].request.created_at >= first.items[1].request.created_at);

    let beyond = app
        .prayers
        .feed(FeedScope::Friends, Some(viewer.id), &Pagination::new(10, 2))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.pagination.total, 3);
    assert_eq!(beyond.pagination.total_pages, 2);
    assert_eq!(beyond.pagination.page, 6);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_viewer_scoped_feeds_require_a_viewer() {
    let app = TestApp::new().await.unwrap();

    for scope in [FeedScope::Home, FeedScope::Groups, FeedScope::Friends] {
        let result = app.prayers.feed(scope, None, &Pagination::default()).await;
        assert!(matches!(result, Err(PrayerError::ViewerRequired)));
    }

    let public = app
        .prayers
        .feed(FeedScope::Public, None, &Pagination::new(0, 5))
        .await
        .unwrap();
    assert!(public.items.len() <= 5);
    assert!(public
        .items
        .iter()
        .all(|view| view.request.visibility == Visibility::Public && view.my_prayer_types.is_empty()));
}
