//! Task status state machine

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three lifecycle states of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
    /// Soft-deleted; visible only in the list's trash
    Deleted,
}

impl TaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
            Self::Deleted => "deleted",
        }
    }

    /// Whether moving from `self` to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `open -> done`, `done -> open`
    /// - `open -> deleted`, `done -> deleted` (soft-delete)
    /// - `deleted -> open` (restore)
    ///
    /// Staying in the same state is always allowed and changes nothing.
    pub fn can_transition_to(self, target: TaskStatus) -> bool {
        self == target
            || matches!(
                (self, target),
                (Self::Open, Self::Done)
                    | (Self::Done, Self::Open)
                    | (Self::Open, Self::Deleted)
                    | (Self::Done, Self::Deleted)
                    | (Self::Deleted, Self::Open)
            )
    }

    /// True when `self -> target` is a completion
    pub fn completes(self, target: TaskStatus) -> bool {
        self == Self::Open && target == Self::Done
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or supplied status string is unknown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "done" => Ok(Self::Done),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_strings() {
        for status in [TaskStatus::Open, TaskStatus::Done, TaskStatus::Deleted] {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("archived".parse::<TaskStatus>().is_err());
        assert!("Open".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_allowed_transitions() {
        use TaskStatus::*;
        assert!(Open.can_transition_to(Done));
        assert!(Done.can_transition_to(Open));
        assert!(Open.can_transition_to(Deleted));
        assert!(Done.can_transition_to(Deleted));
        assert!(Deleted.can_transition_to(Open));
        assert!(Open.can_transition_to(Open));
    }

    #[test]
    fn test_deleted_cannot_complete() {
        assert!(!TaskStatus::Deleted.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_completes() {
        assert!(TaskStatus::Open.completes(TaskStatus::Done));
        assert!(!TaskStatus::Done.completes(TaskStatus::Done));
        assert!(!TaskStatus::Deleted.completes(TaskStatus::Done));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
        let parsed: TaskStatus = serde_json::from_str("\"deleted\"").unwrap();
        assert_eq!(parsed, TaskStatus::Deleted);
    }
}
