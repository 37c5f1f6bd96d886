//! Domain model for the task board state engine.
//!
//! The board domain models project and task aggregates, validated titles and
//! descriptions, workflow stages with a pluggable transition policy, and the
//! ordering allocation applied when tasks are created, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod attachment;
mod description;
mod error;
mod ids;
mod placement;
mod project;
mod stage;
mod task;
mod title;

pub use attachment::Attachment;
pub use description::Description;
pub use error::{BoardDomainError, ParseStageError};
pub use ids::{ProjectId, TaskId};
pub use placement::TaskPlacement;
pub use project::{PersistedProjectData, Project, ProjectSummary};
pub use stage::{AllowAllTransitions, Stage, TransitionPolicy};
pub use task::{PersistedTaskData, Task, TaskDraft, TaskUpdate};
pub use title::Title;
