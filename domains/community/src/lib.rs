//! Community domain: profiles, groups, join requests, friendships, directory search

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    FriendshipEvent, FriendshipStateMachine, JoinRequestEvent, JoinRequestStateMachine,
};
pub use error::CommunityError;

// Re-export repository types
pub use repository::{
    CommunityRepositories, FriendshipRepository, GroupRepository, JoinRequestRepository,
    UserRepository,
};
pub use service::{CommunityService, JoinOutcome, ProfileChanges};

// Re-export API types
pub use api::routes;
pub use api::CommunityState;
