//! Change events published after board mutations.

use crate::board::domain::Title;
use std::fmt;

/// Mutation kind that produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A project was created.
    ProjectCreated,
    /// A project's title or description changed.
    ProjectUpdated,
    /// A project and its tasks were removed.
    ProjectDeleted,
    /// A task was created.
    TaskCreated,
    /// A task's fields or stage changed.
    TaskUpdated,
    /// A task was removed.
    TaskDeleted,
}

/// Event delivered to every connected observer after a successful mutation.
///
/// The real-time channel contract carries only the summary string (topic
/// `notification`); the kind discriminator exists for in-process consumers
/// and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    kind: ChangeKind,
    summary: String,
}

impl ChangeEvent {
    /// Event for a newly created project.
    #[must_use]
    pub fn project_created(title: &Title) -> Self {
        Self {
            kind: ChangeKind::ProjectCreated,
            summary: format!("New project \"{title}\" created!"),
        }
    }

    /// Event for an updated project.
    #[must_use]
    pub fn project_updated(title: &Title) -> Self {
        Self {
            kind: ChangeKind::ProjectUpdated,
            summary: format!("Project \"{title}\" was updated!"),
        }
    }

    /// Event for a deleted project.
    #[must_use]
    pub fn project_deleted() -> Self {
        Self {
            kind: ChangeKind::ProjectDeleted,
            summary: "A project was deleted!".to_owned(),
        }
    }

    /// Event for a newly created task.
    #[must_use]
    pub fn task_created(title: &Title) -> Self {
        Self {
            kind: ChangeKind::TaskCreated,
            summary: format!("New task \"{title}\" added to project!"),
        }
    }

    /// Event for an updated or moved task.
    #[must_use]
    pub fn task_updated(title: &Title) -> Self {
        Self {
            kind: ChangeKind::TaskUpdated,
            summary: format!("Task \"{title}\" was updated!"),
        }
    }

    /// Event for a deleted task.
    #[must_use]
    pub fn task_deleted() -> Self {
        Self {
            kind: ChangeKind::TaskDeleted,
            summary: "A task was deleted!".to_owned(),
        }
    }

    /// Returns the mutation kind.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the human-readable summary carried on the wire.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}
