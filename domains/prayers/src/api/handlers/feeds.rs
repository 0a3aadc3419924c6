//! Feed handlers
//!
//! All feeds answer `{"items": [...], "pagination": {...}}`.

use axum::{
    extract::{Query, State},
    Json,
};
use parish_common::{Page, Pagination};

use crate::api::middleware::{AuthUser, MaybeAuthUser, PrayersState};
use crate::domain::feed::FeedScope;
use crate::domain::view::PrayerRequestView;
use crate::error::PrayerError;

type FeedResult = std::result::Result<Json<Page<PrayerRequestView>>, PrayerError>;

/// Public feed
///
/// **GET /v1/feed**, **GET /v1/feed/public**
///
/// Anonymous callers are allowed; a signed-in caller additionally gets
/// `myPrayerTypes` filled in.
pub async fn public_feed(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<PrayersState>,
    Query(pagination): Query<Pagination>,
) -> FeedResult {
    let viewer = auth.map(|ctx| ctx.user_id());
    let page = state
        .service
        .feed(FeedScope::Public, viewer, &pagination)
        .await?;
    Ok(Json(page))
}

/// Own, friends' and group requests in one stream
///
/// **GET /v1/feed/home**
pub async fn home_feed(
    auth: AuthUser,
    State(state): State<PrayersState>,
    Query(pagination): Query<Pagination>,
) -> FeedResult {
    scoped_feed(FeedScope::Home, auth, state, pagination).await
}

/// **GET /v1/feed/groups**
pub async fn groups_feed(
    auth: AuthUser,
    State(state): State<PrayersState>,
    Query(pagination): Query<Pagination>,
) -> FeedResult {
    scoped_feed(FeedScope::Groups, auth, state, pagination).await
}

/// **GET /v1/feed/friends**
pub async fn friends_feed(
    auth: AuthUser,
    State(state): State<PrayersState>,
    Query(pagination): Query<Pagination>,
) -> FeedResult {
    scoped_feed(FeedScope::Friends, auth, state, pagination).await
}

async fn scoped_feed(
    scope: FeedScope,
    AuthUser(auth): AuthUser,
    state: PrayersState,
    pagination: Pagination,
) -> FeedResult {
    let page = state
        .service
        .feed(scope, Some(auth.user_id()), &pagination)
        .await?;
    Ok(Json(page))
}
