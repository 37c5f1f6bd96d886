//! In-memory board repository.
//!
//! Allocation of task order and sequence happens under the state write lock,
//! so concurrent inserts on one project cannot observe the same max-sequence
//! snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{
        Description, PersistedProjectData, Project, ProjectId, ProjectSummary, Task, TaskDraft,
        TaskId, TaskPlacement, Title,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};

/// Thread-safe in-memory board repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardRepository {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    projects: HashMap<ProjectId, ProjectRecord>,
    title_index: HashMap<String, ProjectId>,
}

#[derive(Debug, Clone)]
struct ProjectRecord {
    id: ProjectId,
    title: Title,
    description: Description,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    fn from_aggregate(project: &Project) -> Self {
        Self {
            id: project.id(),
            title: project.title().clone(),
            description: project.description().clone(),
            tasks: project.tasks().to_vec(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }

    fn to_project(&self) -> Project {
        Project::from_persisted(PersistedProjectData {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            tasks: self.tasks.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

}

impl InMemoryBoardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(
        &self,
    ) -> BoardRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryBoardState>> {
        self.state.read().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> BoardRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryBoardState>> {
        self.state.write().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn insert_project(&self, project: &Project) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let title_key = project.title().as_str().to_owned();
        if state.title_index.contains_key(&title_key) {
            return Err(BoardRepositoryError::DuplicateTitle(title_key));
        }

        state.title_index.insert(title_key, project.id());
        state
            .projects
            .insert(project.id(), ProjectRecord::from_aggregate(project));
        Ok(())
    }

    async fn list_projects(&self) -> BoardRepositoryResult<Vec<ProjectSummary>> {
        let state = self.read_state()?;
        let mut summaries: Vec<ProjectSummary> = state
            .projects
            .values()
            .map(|record| record.to_project().summary())
            .collect();
        summaries.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.title().as_str().cmp(b.title().as_str()))
        });
        Ok(summaries)
    }

    async fn find_project(&self, id: ProjectId) -> BoardRepositoryResult<Option<Project>> {
        let state = self.read_state()?;
        Ok(state.projects.get(&id).map(ProjectRecord::to_project))
    }

    async fn update_project(&self, project: &Project) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let title_key = project.title().as_str().to_owned();

        let colliding = state
            .title_index
            .get(&title_key)
            .is_some_and(|owner| *owner != project.id());
        if colliding {
            return Err(BoardRepositoryError::DuplicateTitle(title_key));
        }

        let previous_title = {
            let record = state
                .projects
                .get_mut(&project.id())
                .ok_or(BoardRepositoryError::ProjectNotFound(project.id()))?;
            let previous = record.title.clone();
            record.title = project.title().clone();
            record.description = project.description().clone();
            record.updated_at = project.updated_at();
            previous
        };

        if previous_title.as_str() != title_key {
            state.title_index.remove(previous_title.as_str());
            state.title_index.insert(title_key, project.id());
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> BoardRepositoryResult<bool> {
        let mut state = self.write_state()?;
        let Some(record) = state.projects.remove(&id) else {
            return Ok(false);
        };
        state.title_index.remove(record.title.as_str());
        Ok(true)
    }

    async fn insert_task(
        &self,
        project_id: ProjectId,
        draft: TaskDraft,
    ) -> BoardRepositoryResult<Task> {
        let mut state = self.write_state()?;
        let record = state
            .projects
            .get_mut(&project_id)
            .ok_or(BoardRepositoryError::ProjectNotFound(project_id))?;

        // Read-and-allocate is atomic here: the write guard spans both the
        // placement computation and the insert.
        let placement = TaskPlacement::allocate(record.tasks.iter().map(Task::sequence));
        let task = Task::from_draft(draft, placement);
        record.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        let record = state
            .projects
            .get(&project_id)
            .ok_or(BoardRepositoryError::ProjectNotFound(project_id))?;
        Ok(record.tasks.iter().find(|task| task.id() == task_id).cloned())
    }

    async fn update_task(&self, project_id: ProjectId, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let record = state
            .projects
            .get_mut(&project_id)
            .ok_or(BoardRepositoryError::ProjectNotFound(project_id))?;
        let slot = record
            .tasks
            .iter_mut()
            .find(|existing| existing.id() == task.id())
            .ok_or(BoardRepositoryError::TaskNotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<bool> {
        let mut state = self.write_state()?;
        let Some(record) = state.projects.get_mut(&project_id) else {
            return Ok(false);
        };
        let before = record.tasks.len();
        record.tasks.retain(|task| task.id() != task_id);
        Ok(record.tasks.len() < before)
    }
}
