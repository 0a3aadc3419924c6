//! Route definitions for community domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{friends, groups, profile};
use super::middleware::CommunityState;

/// Create profile routes
fn profile_routes() -> Router<CommunityState> {
    Router::new()
        .route(
            "/v1/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route(
            "/v1/username-availability",
            get(profile::username_availability),
        )
}

/// Create group and join request routes
fn group_routes() -> Router<CommunityState> {
    Router::new()
        .route(
            "/v1/groups",
            get(groups::list_my_groups).post(groups::create_group),
        )
        .route("/v1/groups/search", get(groups::search_groups))
        .route(
            "/v1/groups/{id}/join-requests",
            get(groups::list_join_requests).post(groups::join_group),
        )
        .route(
            "/v1/groups/{id}/join-requests/{request_id}/approve",
            post(groups::approve_join_request),
        )
}

/// Create friendship and directory routes
fn friend_routes() -> Router<CommunityState> {
    Router::new()
        .route("/v1/friends", get(friends::list_friends))
        .route(
            "/v1/friends/requests",
            get(friends::list_pending_requests).post(friends::send_request),
        )
        .route(
            "/v1/friends/requests/{request_id}/accept",
            post(friends::accept_request),
        )
        .route("/v1/users/search", get(friends::search_users))
}

/// Create all community domain API routes
pub fn routes() -> Router<CommunityState> {
    Router::new()
        .merge(profile_routes())
        .merge(group_routes())
        .merge(friend_routes())
}
