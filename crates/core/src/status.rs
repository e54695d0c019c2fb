//! Moderation status of an event.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Moderation state. New submissions start as [`EventStatus::Pending`];
/// only a moderator moves them to approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
        }
    }

    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown event status '{other}'"
            ))),
        }
    }

    /// Only events with this status appear in public listings.
    pub fn is_public(self) -> bool {
        self == Self::Approved
    }

    /// Check a moderation decision. Decisions are final: only pending
    /// events can move, and only to approved or rejected.
    pub fn validate_transition(self, to: EventStatus) -> Result<(), CoreError> {
        match (self, to) {
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected) => Ok(()),
            (from, to) => Err(CoreError::Conflict(format!(
                "Cannot move event from '{}' to '{}'",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_approved_is_public() {
        assert!(EventStatus::Approved.is_public());
        assert!(!EventStatus::Pending.is_public());
        assert!(!EventStatus::Rejected.is_public());
    }

    #[test]
    fn pending_can_be_decided() {
        assert!(EventStatus::Pending
            .validate_transition(EventStatus::Approved)
            .is_ok());
        assert!(EventStatus::Pending
            .validate_transition(EventStatus::Rejected)
            .is_ok());
    }

    #[test]
    fn decided_events_cannot_move() {
        assert!(EventStatus::Approved
            .validate_transition(EventStatus::Rejected)
            .is_err());
        assert!(EventStatus::Rejected
            .validate_transition(EventStatus::Approved)
            .is_err());
        assert!(EventStatus::Pending
            .validate_transition(EventStatus::Pending)
            .is_err());
    }

    #[test]
    fn names_round_trip() {
        for status in [
            EventStatus::Pending,
            EventStatus::Approved,
            EventStatus::Rejected,
        ] {
            assert_eq!(EventStatus::from_name(status.as_str()).unwrap(), status);
        }
        assert!(EventStatus::from_name("archived").is_err());
    }
}
