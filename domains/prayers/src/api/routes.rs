//! Route definitions for prayers domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{feeds, requests};
use super::middleware::PrayersState;

/// Create feed routes
fn feed_routes() -> Router<PrayersState> {
    Router::new()
        .route("/v1/feed", get(feeds::public_feed))
        .route("/v1/feed/public", get(feeds::public_feed))
        .route("/v1/feed/home", get(feeds::home_feed))
        .route("/v1/feed/groups", get(feeds::groups_feed))
        .route("/v1/feed/friends", get(feeds::friends_feed))
}

/// Create prayer request routes
fn request_routes() -> Router<PrayersState> {
    Router::new()
        .route("/v1/requests", post(requests::create_request))
        .route(
            "/v1/requests/{id}",
            get(requests::get_request)
                .patch(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/v1/requests/{id}/pray", post(requests::pray))
}

/// Create all prayers domain API routes
pub fn routes() -> Router<PrayersState> {
    Router::new().merge(feed_routes()).merge(request_routes())
}
