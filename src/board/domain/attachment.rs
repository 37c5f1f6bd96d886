//! Task attachment value type.

use serde::{Deserialize, Serialize};

/// Link attached to a task.
///
/// The serialized field name for the kind is `type`, preserving the shape of
/// the durable task record external consumers rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

impl Attachment {
    /// Creates an attachment from a kind label and URL.
    #[must_use]
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
        }
    }

    /// Returns the attachment kind label.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the attachment URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}
