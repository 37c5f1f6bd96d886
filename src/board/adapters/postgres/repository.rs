//! `PostgreSQL` repository implementation for board persistence.

use super::{
    models::{NewProjectRow, NewTaskRow, ProjectRow, TaskRow},
    schema::{projects, tasks},
};
use crate::board::{
    domain::{
        Attachment, Description, PersistedProjectData, PersistedTaskData, Project, ProjectId,
        ProjectSummary, Stage, Task, TaskDraft, TaskId, TaskPlacement, Title,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed board repository.
///
/// Task insertion allocates order and sequence inside a transaction holding
/// a row lock on the parent project, serializing concurrent creates per
/// project.
#[derive(Debug, Clone)]
pub struct PostgresBoardRepository {
    pool: BoardPgPool,
}

/// Error carrier for transactional closures: diesel rollback errors and
/// repository errors travel together until the transaction resolves.
#[derive(Debug, Error)]
enum TxError {
    #[error(transparent)]
    Diesel(#[from] DieselError),
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
}

impl TxError {
    fn into_repository(self) -> BoardRepositoryError {
        match self {
            Self::Diesel(err) => BoardRepositoryError::persistence(err),
            Self::Repository(err) => err,
        }
    }
}

impl PostgresBoardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardRepositoryError::persistence)?
    }
}

#[async_trait]
impl BoardRepository for PostgresBoardRepository {
    async fn insert_project(&self, project: &Project) -> BoardRepositoryResult<()> {
        let new_row = project_to_new_row(project);
        let title = project.title().as_str().to_owned();

        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BoardRepositoryError::DuplicateTitle(title.clone())
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_projects(&self) -> BoardRepositoryResult<Vec<ProjectSummary>> {
        self.run_blocking(|connection| {
            let rows = projects::table
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_summary).collect()
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> BoardRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let maybe_row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            let Some(row) = maybe_row else {
                return Ok(None);
            };

            let task_rows = tasks::table
                .filter(tasks::project_id.eq(id.into_inner()))
                .order((tasks::display_order.asc(), tasks::sequence.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            let task_list = task_rows
                .into_iter()
                .map(row_to_task)
                .collect::<BoardRepositoryResult<Vec<Task>>>()?;

            Ok(Some(row_to_project(row, task_list)?))
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> BoardRepositoryResult<()> {
        let id = project.id();
        let title = project.title().as_str().to_owned();
        let description = project.description().as_str().to_owned();
        let updated_at = project.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(projects::table.find(id.into_inner()))
                .set((
                    projects::title.eq(&title),
                    projects::description.eq(&description),
                    projects::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BoardRepositoryError::DuplicateTitle(title.clone())
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            if affected == 0 {
                return Err(BoardRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> BoardRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<bool, DieselError, _>(|tx| {
                    diesel::delete(tasks::table.filter(tasks::project_id.eq(id.into_inner())))
                        .execute(tx)?;
                    let affected =
                        diesel::delete(projects::table.find(id.into_inner())).execute(tx)?;
                    Ok(affected > 0)
                })
                .map_err(BoardRepositoryError::persistence)
        })
        .await
    }

    async fn insert_task(
        &self,
        project_id: ProjectId,
        draft: TaskDraft,
    ) -> BoardRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<Task, TxError, _>(|tx| {
                    // Row lock on the parent project serializes concurrent
                    // allocations for the same project.
                    let locked = projects::table
                        .find(project_id.into_inner())
                        .for_update()
                        .select(projects::id)
                        .get_result::<uuid::Uuid>(tx)
                        .optional()?;
                    if locked.is_none() {
                        return Err(BoardRepositoryError::ProjectNotFound(project_id).into());
                    }

                    let stored_sequences = tasks::table
                        .filter(tasks::project_id.eq(project_id.into_inner()))
                        .select(tasks::sequence)
                        .load::<i64>(tx)?;
                    let mut sequences = Vec::with_capacity(stored_sequences.len());
                    for sequence in stored_sequences {
                        sequences.push(
                            u64::try_from(sequence).map_err(BoardRepositoryError::persistence)?,
                        );
                    }

                    let placement = TaskPlacement::allocate(sequences);
                    let task = Task::from_draft(draft, placement);
                    let new_row = task_to_new_row(project_id, &task)?;
                    diesel::insert_into(tasks::table)
                        .values(&new_row)
                        .execute(tx)?;
                    Ok(task)
                })
                .map_err(TxError::into_repository)
        })
        .await
    }

    async fn find_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            require_project(connection, project_id)?;

            let row = tasks::table
                .filter(
                    tasks::id
                        .eq(task_id.into_inner())
                        .and(tasks::project_id.eq(project_id.into_inner())),
                )
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_task(&self, project_id: ProjectId, task: &Task) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let title = task.title().as_str().to_owned();
        let description = task.description().as_str().to_owned();
        let start_date = task.start_date();
        let end_date = task.end_date();
        let stage = task.stage().as_str().to_owned();
        let attachments = serde_json::to_value(task.attachments())
            .map_err(BoardRepositoryError::persistence)?;
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            require_project(connection, project_id)?;

            let affected = diesel::update(
                tasks::table.filter(
                    tasks::id
                        .eq(task_id.into_inner())
                        .and(tasks::project_id.eq(project_id.into_inner())),
                ),
            )
            .set((
                tasks::title.eq(&title),
                tasks::description.eq(&description),
                tasks::start_date.eq(start_date),
                tasks::end_date.eq(end_date),
                tasks::stage.eq(&stage),
                tasks::attachments.eq(&attachments),
                tasks::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;
            if affected == 0 {
                return Err(BoardRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> BoardRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                tasks::table.filter(
                    tasks::id
                        .eq(task_id.into_inner())
                        .and(tasks::project_id.eq(project_id.into_inner())),
                ),
            )
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }
}

/// Fails with [`BoardRepositoryError::ProjectNotFound`] when the project row
/// is absent.
fn require_project(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> BoardRepositoryResult<()> {
    let found = projects::table
        .find(project_id.into_inner())
        .select(projects::id)
        .first::<uuid::Uuid>(connection)
        .optional()
        .map_err(BoardRepositoryError::persistence)?;
    if found.is_none() {
        return Err(BoardRepositoryError::ProjectNotFound(project_id));
    }
    Ok(())
}

fn project_to_new_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        title: project.title().as_str().to_owned(),
        description: project.description().as_str().to_owned(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_summary(row: ProjectRow) -> BoardRepositoryResult<ProjectSummary> {
    let title = Title::new(row.title).map_err(BoardRepositoryError::persistence)?;
    let description =
        Description::new(row.description).map_err(BoardRepositoryError::persistence)?;
    Ok(ProjectSummary::from_parts(
        ProjectId::from_uuid(row.id),
        title,
        description,
        row.created_at,
        row.updated_at,
    ))
}

fn row_to_project(row: ProjectRow, task_list: Vec<Task>) -> BoardRepositoryResult<Project> {
    let title = Title::new(row.title).map_err(BoardRepositoryError::persistence)?;
    let description =
        Description::new(row.description).map_err(BoardRepositoryError::persistence)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        title,
        description,
        tasks: task_list,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let title = Title::new(row.title).map_err(BoardRepositoryError::persistence)?;
    let description =
        Description::new(row.description).map_err(BoardRepositoryError::persistence)?;
    let stage =
        Stage::try_from(row.stage.as_str()).map_err(BoardRepositoryError::persistence)?;
    let order = u32::try_from(row.display_order).map_err(BoardRepositoryError::persistence)?;
    let sequence = u64::try_from(row.sequence).map_err(BoardRepositoryError::persistence)?;
    let attachments: Vec<Attachment> =
        serde_json::from_value(row.attachments).map_err(BoardRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title,
        description,
        start_date: row.start_date,
        end_date: row.end_date,
        stage,
        placement: TaskPlacement::from_parts(order, sequence),
        attachments,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn task_to_new_row(project_id: ProjectId, task: &Task) -> Result<NewTaskRow, TxError> {
    let display_order =
        i32::try_from(task.order()).map_err(BoardRepositoryError::persistence)?;
    let sequence = i64::try_from(task.sequence()).map_err(BoardRepositoryError::persistence)?;
    let attachments =
        serde_json::to_value(task.attachments()).map_err(BoardRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        project_id: project_id.into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        start_date: task.start_date(),
        end_date: task.end_date(),
        stage: task.stage().as_str().to_owned(),
        display_order,
        sequence,
        attachments,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}
