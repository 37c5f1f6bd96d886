//! Error types for board domain validation and parsing.

use super::Stage;
use thiserror::Error;

/// Errors returned while constructing or mutating domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The title is shorter than the minimum length after trimming.
    #[error("title '{0}' is shorter than {min} characters", min = super::Title::MIN_LENGTH)]
    TitleTooShort(String),

    /// The title exceeds the maximum length.
    #[error("title '{0}' is longer than {max} characters", max = super::Title::MAX_LENGTH)]
    TitleTooLong(String),

    /// The description is empty after trimming.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The configured transition policy rejected a stage move.
    #[error("stage transition from '{from}' to '{to}' is not permitted")]
    TransitionDenied {
        /// Stage the task currently occupies.
        from: Stage,
        /// Stage the move targeted.
        to: Stage,
    },
}

/// Error returned while parsing stage labels from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown stage label: {0}")]
pub struct ParseStageError(pub String);
