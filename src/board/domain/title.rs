//! Validated title type shared by projects and tasks.

use super::BoardDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated project or task title.
///
/// Titles are trimmed on construction and must be between
/// [`Title::MIN_LENGTH`] and [`Title::MAX_LENGTH`] characters inclusive,
/// matching the limits enforced at the request-validation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Minimum title length in characters.
    pub const MIN_LENGTH: usize = 3;

    /// Maximum title length in characters.
    pub const MAX_LENGTH: usize = 30;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TitleTooShort`] when the trimmed value is
    /// under three characters or [`BoardDomainError::TitleTooLong`] when it
    /// exceeds thirty characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let length = normalized.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(BoardDomainError::TitleTooShort(raw));
        }
        if length > Self::MAX_LENGTH {
            return Err(BoardDomainError::TitleTooLong(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
