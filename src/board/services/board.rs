//! Service layer orchestrating board mutations, reads, and notifications.

use crate::board::{
    domain::{
        AllowAllTransitions, Attachment, BoardDomainError, Description, Project, ProjectId,
        ProjectSummary, Stage, Task, TaskDraft, TaskId, TaskUpdate, Title, TransitionPolicy,
    },
    ports::{BoardRepository, BoardRepositoryError},
};
use crate::notification::{ChangeEvent, NotificationHub};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    title: String,
    description: String,
}

impl CreateProjectRequest {
    /// Creates a request with the required project fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Request payload for replacing a project's title and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    title: String,
    description: String,
}

impl UpdateProjectRequest {
    /// Creates a request with the replacement project fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    attachments: Vec<Attachment>,
}

impl CreateTaskRequest {
    /// Creates a request with the required task fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            start_date,
            end_date,
            attachments: Vec::new(),
        }
    }

    /// Sets the task's attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    fn into_draft(self, clock: &impl Clock) -> Result<TaskDraft, BoardDomainError> {
        let title = Title::new(self.title)?;
        let description = Description::new(self.description)?;
        Ok(
            TaskDraft::new(title, description, self.start_date, self.end_date, clock)
                .with_attachments(self.attachments),
        )
    }
}

/// Request payload for partially updating a task.
///
/// Only the set fields are replaced; everything else keeps its current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    stage: Option<Stage>,
    attachments: Option<Vec<Attachment>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update request.
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
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

    fn into_update(self) -> Result<TaskUpdate, BoardDomainError> {
        let mut update = TaskUpdate::new();
        if let Some(title) = self.title {
            update = update.with_title(Title::new(title)?);
        }
        if let Some(description) = self.description {
            update = update.with_description(Description::new(description)?);
        }
        if let Some(start_date) = self.start_date {
            update = update.with_start_date(start_date);
        }
        if let Some(end_date) = self.end_date {
            update = update.with_end_date(end_date);
        }
        if let Some(stage) = self.stage {
            update = update.with_stage(stage);
        }
        if let Some(attachments) = self.attachments {
            update = update.with_attachments(attachments);
        }
        Ok(update)
    }
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// Domain validation failed before any mutation was attempted.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Board orchestration service.
///
/// Validates input before any store call, delegates persistence to the
/// repository port, and publishes exactly one change event per successful
/// mutation. Notification delivery is fire-and-forget: the mutation outcome
/// never depends on whether anyone was listening.
pub struct BoardService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifications: NotificationHub,
    policy: Arc<dyn TransitionPolicy>,
    clock: Arc<C>,
}

impl<R, C> Clone for BoardService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifications: self.notifications.clone(),
            policy: Arc::clone(&self.policy),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> BoardService<R, C>
where
    R: BoardRepository,
    C: Clock + Send + Sync,
{
    /// Creates a board service with the default allow-all transition policy.
    #[must_use]
    pub fn new(repository: Arc<R>, notifications: NotificationHub, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifications,
            policy: Arc::new(AllowAllTransitions),
            clock,
        }
    }

    /// Replaces the stage transition policy.
    #[must_use]
    pub fn with_transition_policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a project with an empty task list.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any store call, or
    /// [`BoardRepositoryError::DuplicateTitle`] when the title collides with
    /// an existing project.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> BoardServiceResult<Project> {
        let title = Title::new(request.title)?;
        let description = Description::new(request.description)?;

        let project = Project::new(title, description, &*self.clock);
        self.repository.insert_project(&project).await?;
        self.notifications
            .publish(ChangeEvent::project_created(project.title()));
        Ok(project)
    }

    /// Lists all projects in tasks-excluded summary form.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the listing read fails.
    pub async fn list_projects(&self) -> BoardServiceResult<Vec<ProjectSummary>> {
        Ok(self.repository.list_projects().await?)
    }

    /// Fetches a project by identifier, tasks included in display order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    pub async fn fetch_project(&self, id: ProjectId) -> BoardServiceResult<Project> {
        let project = self
            .repository
            .find_project(id)
            .await?
            .ok_or(BoardRepositoryError::ProjectNotFound(id))?;
        Ok(project)
    }

    /// Replaces a project's title and description.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any store call,
    /// [`BoardRepositoryError::ProjectNotFound`] when the project does not
    /// exist, or [`BoardRepositoryError::DuplicateTitle`] when the new title
    /// collides with another project.
    pub async fn update_project(
        &self,
        id: ProjectId,
        request: UpdateProjectRequest,
    ) -> BoardServiceResult<Project> {
        let title = Title::new(request.title)?;
        let description = Description::new(request.description)?;

        let mut project = self.fetch_project(id).await?;
        project.update_details(title, description, &*self.clock);
        self.repository.update_project(&project).await?;
        self.notifications
            .publish(ChangeEvent::project_updated(project.title()));
        Ok(project)
    }

    /// Deletes a project and every task it contains.
    ///
    /// Idempotent: returns whether a project was removed, and publishes a
    /// deletion event only when one was.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the delete fails.
    pub async fn delete_project(&self, id: ProjectId) -> BoardServiceResult<bool> {
        let removed = self.repository.delete_project(id).await?;
        if removed {
            self.notifications.publish(ChangeEvent::project_deleted());
        }
        Ok(removed)
    }

    /// Creates a task in a project.
    ///
    /// The task starts in [`Stage::Requested`] with an order and sequence
    /// allocated atomically with respect to concurrent creates on the same
    /// project. Retried creates produce distinct tasks: creation is the one
    /// operation that is not idempotent.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any store call, or
    /// [`BoardRepositoryError::ProjectNotFound`] when the project does not
    /// exist.
    pub async fn create_task(
        &self,
        project_id: ProjectId,
        request: CreateTaskRequest,
    ) -> BoardServiceResult<Task> {
        let draft = request.into_draft(&*self.clock)?;
        let task = self.repository.insert_task(project_id, draft).await?;
        self.notifications
            .publish(ChangeEvent::task_created(task.title()));
        Ok(task)
    }

    /// Partially updates a task's fields.
    ///
    /// Last write wins under concurrent updates to the same task.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any store call, or a not-found
    /// error when the project or task is absent: matching nothing is never
    /// reported as success.
    pub async fn update_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoardServiceResult<Task> {
        let update = request.into_update()?;
        let mut task = self.require_task(project_id, task_id).await?;
        task.apply(update, &*self.clock);
        self.repository.update_task(project_id, &task).await?;
        self.notifications
            .publish(ChangeEvent::task_updated(task.title()));
        Ok(task)
    }

    /// Moves a task to a target stage through the transition policy.
    ///
    /// Under the default policy every ordered stage pair is permitted,
    /// including same-stage moves. Column position is derived at read time
    /// from order and sequence; a move persists no per-column rank.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::TransitionDenied`] when a non-default
    /// policy rejects the move, or a not-found error when the project or
    /// task is absent.
    pub async fn move_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        target: Stage,
    ) -> BoardServiceResult<Task> {
        let mut task = self.require_task(project_id, task_id).await?;
        task.move_to(target, self.policy.as_ref(), &*self.clock)?;
        self.repository.update_task(project_id, &task).await?;
        self.notifications
            .publish(ChangeEvent::task_updated(task.title()));
        Ok(task)
    }

    /// Removes a task from its project.
    ///
    /// Idempotent: returns whether a task was removed, and publishes a
    /// deletion event only when one was.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Repository`] when the delete fails.
    pub async fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardServiceResult<bool> {
        let removed = self.repository.delete_task(project_id, task_id).await?;
        if removed {
            self.notifications.publish(ChangeEvent::task_deleted());
        }
        Ok(removed)
    }

    async fn require_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardServiceResult<Task> {
        let task = self
            .repository
            .find_task(project_id, task_id)
            .await?
            .ok_or(BoardRepositoryError::TaskNotFound(task_id))?;
        Ok(task)
    }
}
