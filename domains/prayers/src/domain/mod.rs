//! Prayers domain layer: entities, state machine, visibility policy, feed scopes

pub mod entities;
pub mod feed;
pub mod state;
pub mod view;
pub mod visibility;
