//! State machines for community entities
//!
//! Join requests cycle between `PENDING` and `APPROVED` (a re-request after
//! approval starts over). Friendships go `PENDING` → `ACCEPTED` once.

use parish_common::StateError;

use crate::domain::entities::{FriendshipStatus, JoinRequestStatus};

// ============================================================================
// Join Request State Machine
// ============================================================================

impl JoinRequestStatus {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [JoinRequestStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Pending],
            Self::Approved => &[Self::Pending],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinRequestEvent {
    /// Group admin approves the request
    Approve,
    /// Requester asks again
    Request,
}

impl std::fmt::Display for JoinRequestEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Request => write!(f, "request"),
        }
    }
}

pub struct JoinRequestStateMachine;

impl JoinRequestStateMachine {
    pub fn transition(
        current: JoinRequestStatus,
        event: JoinRequestEvent,
    ) -> Result<JoinRequestStatus, StateError> {
        match (current, event) {
            (JoinRequestStatus::Pending, JoinRequestEvent::Approve) => {
                Ok(JoinRequestStatus::Approved)
            }
            (_, JoinRequestEvent::Request) => Ok(JoinRequestStatus::Pending),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }

    pub fn can_transition(current: JoinRequestStatus, event: JoinRequestEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

// ============================================================================
// Friendship State Machine
// ============================================================================

impl FriendshipStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [FriendshipStatus] {
        match self {
            Self::Pending => &[Self::Accepted],
            Self::Accepted => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FriendshipEvent {
    /// The addressed user accepts
    Accept,
}

impl std::fmt::Display for FriendshipEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
        }
    }
}

pub struct FriendshipStateMachine;

impl FriendshipStateMachine {
    pub fn transition(
        current: FriendshipStatus,
        event: FriendshipEvent,
    ) -> Result<FriendshipStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (FriendshipStatus::Pending, FriendshipEvent::Accept) => Ok(FriendshipStatus::Accepted),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
