//! Repository port for project and task persistence.

use crate::board::domain::{Project, ProjectId, ProjectSummary, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Persistence contract for project and task aggregates.
///
/// Deletes are idempotent and report whether anything was removed; lookups
/// signal absence with `None`. Mutations on missing records surface typed
/// not-found errors rather than succeeding on zero matches.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateTitle`] when another project
    /// already holds the same title.
    async fn insert_project(&self, project: &Project) -> BoardRepositoryResult<()>;

    /// Lists all projects in tasks-excluded summary form.
    async fn list_projects(&self) -> BoardRepositoryResult<Vec<ProjectSummary>>;

    /// Finds a project by identifier, tasks included.
    ///
    /// Returns `None` when the project does not exist.
    async fn find_project(&self, id: ProjectId) -> BoardRepositoryResult<Option<Project>>;

    /// Persists changes to an existing project's title and description.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ProjectNotFound`] when the project
    /// does not exist or [`BoardRepositoryError::DuplicateTitle`] when the
    /// new title collides with another project.
    async fn update_project(&self, project: &Project) -> BoardRepositoryResult<()>;

    /// Deletes a project and every task it contains.
    ///
    /// Returns whether a project was removed; deleting an absent project is
    /// not an error.
    async fn delete_project(&self, id: ProjectId) -> BoardRepositoryResult<bool>;

    /// Inserts a new task into a project, allocating its order and sequence
    /// atomically with respect to concurrent inserts on the same project.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist.
    async fn insert_task(
        &self,
        project_id: ProjectId,
        draft: TaskDraft,
    ) -> BoardRepositoryResult<Task>;

    /// Finds a task within a project.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist.
    async fn find_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Task>>;

    /// Persists changes to an existing task (fields, stage, timestamps).
    ///
    /// Last write wins under concurrent updates to the same task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ProjectNotFound`] when the owning
    /// project does not exist or [`BoardRepositoryError::TaskNotFound`] when
    /// the task does not exist within it.
    async fn update_task(&self, project_id: ProjectId, task: &Task) -> BoardRepositoryResult<()>;

    /// Removes a task from its project.
    ///
    /// Returns whether a task was removed; deleting an absent task (or a
    /// task of an absent project) is not an error.
    async fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<bool>;
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// Another project already holds this title.
    #[error("project title must be unique: '{0}'")]
    DuplicateTitle(String),

    /// The referenced project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The referenced task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
