//! Task aggregate root and its creation/update payloads.

use super::{
    Attachment, BoardDomainError, Description, Stage, TaskId, TaskPlacement, Title,
    TransitionPolicy,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated payload for creating a task.
///
/// Both dates are required. An `end_date` earlier than `start_date` is
/// accepted: the board derives overdue styling from the dates at render time
/// and places no ordering constraint on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: Title,
    description: Description,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    attachments: Vec<Attachment>,
    created_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Creates a draft with the required task fields, capturing the creation
    /// timestamp from the supplied clock.
    #[must_use]
    pub fn new(
        title: Title,
        description: Description,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            title,
            description,
            start_date,
            end_date,
            attachments: Vec::new(),
            created_at: clock.utc(),
        }
    }

    /// Sets the draft's attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    /// Returns the draft title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }
}

/// Partial update applied to an existing task.
///
/// Fields left unset keep their current value. Concurrent updates to the
/// same task are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<Title>,
    description: Option<Description>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    stage: Option<Stage>,
    attachments: Option<Vec<Attachment>>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            title: None,
            description: None,
            start_date: None,
            end_date: None,
            stage: None,
            attachments: None,
        }
    }

    /// Replaces the task title.
    #[must_use]
    pub fn with_title(mut self, title: Title) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces the task description.
    #[must_use]
    pub fn with_description(mut self, description: Description) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the task start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Replaces the task end date.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Replaces the task stage.
    #[must_use]
    pub const fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Replaces the task attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = Some(attachments.into_iter().collect());
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    title: Title,
    description: Description,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    stage: Stage,
    #[serde(flatten)]
    placement: TaskPlacement,
    attachments: Vec<Attachment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: Title,
    /// Persisted description.
    pub description: Description,
    /// Persisted start date.
    pub start_date: DateTime<Utc>,
    /// Persisted end date.
    pub end_date: DateTime<Utc>,
    /// Persisted workflow stage.
    pub stage: Stage,
    /// Persisted order and sequence.
    pub placement: TaskPlacement,
    /// Persisted attachments.
    pub attachments: Vec<Attachment>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materializes a task from a draft and an allocated placement.
    ///
    /// The store assigns the identifier here; every task starts in
    /// [`Stage::Requested`].
    #[must_use]
    pub fn from_draft(draft: TaskDraft, placement: TaskPlacement) -> Self {
        let TaskDraft {
            title,
            description,
            start_date,
            end_date,
            attachments,
            created_at,
        } = draft;

        Self {
            id: TaskId::new(),
            title,
            description,
            start_date,
            end_date,
            stage: Stage::Requested,
            placement,
            attachments,
            created_at,
            updated_at: created_at,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            start_date: data.start_date,
            end_date: data.end_date,
            stage: data.stage,
            placement: data.placement,
            attachments: data.attachments,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the task start date.
    #[must_use]
    pub const fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Returns the task end date.
    #[must_use]
    pub const fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Returns the workflow stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the display order within the project.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.placement.order()
    }

    /// Returns the per-project creation sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.placement.sequence()
    }

    /// Returns the task attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update and refreshes the update timestamp.
    pub fn apply(&mut self, update: TaskUpdate, clock: &impl Clock) {
        let TaskUpdate {
            title,
            description,
            start_date,
            end_date,
            stage,
            attachments,
        } = update;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_start) = start_date {
            self.start_date = new_start;
        }
        if let Some(new_end) = end_date {
            self.end_date = new_end;
        }
        if let Some(new_stage) = stage {
            self.stage = new_stage;
        }
        if let Some(new_attachments) = attachments {
            self.attachments = new_attachments;
        }
        self.touch(clock);
    }

    /// Moves the task to a target stage through the transition policy.
    ///
    /// Position within a column is a read-time derivation from order and
    /// sequence; no per-column rank is persisted by a move.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TransitionDenied`] when the policy
    /// rejects the move. The default policy never does.
    pub fn move_to(
        &mut self,
        target: Stage,
        policy: &dyn TransitionPolicy,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        if !policy.allows(self.stage, target) {
            return Err(BoardDomainError::TransitionDenied {
                from: self.stage,
                to: target,
            });
        }
        self.stage = target;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
