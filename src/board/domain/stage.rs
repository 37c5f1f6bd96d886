//! Workflow stage enumeration and the transition policy seam.

use super::ParseStageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow stage a task occupies on the board.
///
/// The serialized labels match the column names persisted by the store and
/// rendered by board consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Task has been requested but not yet accepted into the backlog.
    #[serde(rename = "Requested")]
    Requested,
    /// Task is queued for work.
    #[serde(rename = "To do")]
    ToDo,
    /// Task is actively being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Task is complete.
    #[serde(rename = "Done")]
    Done,
}

impl Stage {
    /// All stages in board column order.
    pub const ALL: [Self; 4] = [Self::Requested, Self::ToDo, Self::InProgress, Self::Done];

    /// Returns the canonical storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "Requested",
            Self::ToDo => "To do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "requested" => Ok(Self::Requested),
            "to do" => Ok(Self::ToDo),
            "in progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseStageError(value.to_owned())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy seam deciding which stage moves are legal.
///
/// The board enforces no workflow graph of its own: the shipped default,
/// [`AllowAllTransitions`], permits every ordered pair of stages including
/// same-stage moves. Deployments wanting a stricter workflow supply their own
/// implementation without changing the default contract.
pub trait TransitionPolicy: Send + Sync {
    /// Returns whether a task may move from `from` to `to`.
    fn allows(&self, from: Stage, to: Stage) -> bool;
}

/// Default transition policy: every stage is reachable from every other
/// stage in a single move.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllTransitions;

impl TransitionPolicy for AllowAllTransitions {
    fn allows(&self, _from: Stage, _to: Stage) -> bool {
        true
    }
}
