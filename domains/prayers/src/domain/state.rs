//! Prayer request status machine
//!
//! The only write-side transition is the author's delete, which archives
//! the request. `ARCHIVED` and `REMOVED` are terminal.

use parish_common::StateError;

use crate::domain::entities::PrayerStatus;

impl PrayerStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived | Self::Removed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [PrayerStatus] {
        match self {
            Self::PendingReview | Self::Active | Self::Closed => &[Self::Archived],
            Self::Archived | Self::Removed => &[],
        }
    }
}

/// Events that change a prayer request's status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrayerStatusEvent {
    /// Author deletes the request
    Delete,
}

impl std::fmt::Display for PrayerStatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Prayer request state machine
pub struct PrayerStatusMachine;

impl PrayerStatusMachine {
    pub fn transition(
        current: PrayerStatus,
        event: PrayerStatusEvent,
    ) -> Result<PrayerStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (
                PrayerStatus::PendingReview | PrayerStatus::Active | PrayerStatus::Closed,
                PrayerStatusEvent::Delete,
            ) => Ok(PrayerStatus::Archived),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
