//! Integration tests for [`PostgresBoardRepository`] using embedded `PostgreSQL`.
//!
//! These tests exercise the `PostgreSQL` repository implementation against a
//! real database instance, verifying CRUD operations, the title uniqueness
//! constraint, and the row-locked order/sequence allocation under concurrent
//! task creation.
//!
//! Uses `pg-embed-setup-unpriv` for embedded `PostgreSQL` lifecycle management.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::print_stderr,
    reason = "Test cleanup warnings are informational"
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use corkboard::board::{
    adapters::postgres::PostgresBoardRepository,
    domain::{
        Attachment, Description, Project, ProjectId, Stage, Task, TaskDraft, TaskId, TaskUpdate,
        Title,
    },
    ports::{BoardRepository, BoardRepositoryError},
};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use tokio::runtime::Runtime;

/// SQL to create the board schema for tests.
const CREATE_SCHEMA_SQL: &str =
    include_str!("../migrations/2025-08-27-000000_create_board_tables/up.sql");

/// Template database name for pre-migrated schema.
const TEMPLATE_DB: &str = "corkboard_test_template";

/// Creates a tokio runtime for async operations in tests.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Creates a multi-threaded runtime for tests that race concurrent writers.
fn concurrency_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("failed to create concurrency runtime")
}

/// Ensures the template database exists with the schema applied.
fn ensure_template(cluster: &TestCluster) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            // Execute statement-by-statement since diesel::sql_query cannot
            // execute multiple statements in a single call
            execute_sql_statements(&mut conn, CREATE_SCHEMA_SQL)?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    Ok(())
}

/// Executes multiple SQL statements from a single string.
///
/// Splits on semicolons and executes each non-empty statement individually.
fn execute_sql_statements(conn: &mut PgConnection, sql: &str) -> eyre::Result<()> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        // Skip empty statements and comment-only fragments
        if trimmed.is_empty() || trimmed.lines().all(|line| line.trim().starts_with("--")) {
            continue;
        }
        diesel::sql_query(trimmed)
            .execute(conn)
            .map_err(|e| eyre::eyre!("SQL error: {e}\nStatement: {trimmed}"))?;
    }
    Ok(())
}

/// Creates a test database from template and returns a repository.
fn setup_repository(
    cluster: &TestCluster,
    db_name: &str,
    pool_size: u32,
) -> Result<PostgresBoardRepository, Box<dyn std::error::Error + Send + Sync>> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    Ok(PostgresBoardRepository::new(pool))
}

/// Creates a test project with the given title.
fn board_project(title: &str) -> Project {
    Project::new(
        Title::new(title).expect("valid title"),
        Description::new("Postgres integration test").expect("valid description"),
        &DefaultClock,
    )
}

/// Creates a test task draft with the given title.
fn task_draft(title: &str) -> TaskDraft {
    let start = Utc::now();
    TaskDraft::new(
        Title::new(title).expect("valid title"),
        Description::new("Postgres integration test").expect("valid description"),
        start,
        start + Duration::days(3),
        &DefaultClock,
    )
}

/// Cleans up a test database.
fn cleanup_database(cluster: &TestCluster, db_name: &str) {
    if let Err(e) = cluster.drop_database(db_name) {
        eprintln!("Warning: failed to drop test database {db_name}: {e}");
    }
}

/// Guard that ensures test database cleanup runs even if the test panics.
struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        cleanup_database(self.cluster, &self.db_name);
    }
}

// ============================================================================
// Basic CRUD Operations
// ============================================================================

#[rstest]
fn project_and_task_round_trip(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_round_trip_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let project = board_project("Round trip");
    let draft = task_draft("Attach the brief")
        .with_attachments([Attachment::new("link", "https://example.com/brief")]);

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&project))
        .expect("insert project");
    let task = rt
        .block_on(repo.insert_task(project.id(), draft))
        .expect("insert task");

    assert_eq!(task.stage(), Stage::Requested);
    assert_eq!(task.order(), 0);
    assert_eq!(task.sequence(), 1);

    let fetched = rt
        .block_on(repo.find_project(project.id()))
        .expect("find project")
        .expect("project exists");
    assert_eq!(fetched.title().as_str(), "Round trip");
    assert_eq!(fetched.tasks().len(), 1);

    let stored = rt
        .block_on(repo.find_task(project.id(), task.id()))
        .expect("find task")
        .expect("task exists");
    assert_eq!(stored.title().as_str(), "Attach the brief");
    assert_eq!(stored.attachments().len(), 1);
    assert_eq!(stored.attachments()[0].kind(), "link");
}

#[rstest]
fn stage_labels_survive_persistence(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_stage_labels_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let project = board_project("Stage labels");

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&project))
        .expect("insert project");
    let mut task = rt
        .block_on(repo.insert_task(project.id(), task_draft("Stage carrier")))
        .expect("insert task");

    // "In Progress" has the trickiest label; write it back and reload.
    task.apply(TaskUpdate::new().with_stage(Stage::InProgress), &DefaultClock);
    rt.block_on(repo.update_task(project.id(), &task))
        .expect("update task");

    let reloaded = rt
        .block_on(repo.find_task(project.id(), task.id()))
        .expect("find task")
        .expect("task exists");
    assert_eq!(reloaded.stage(), Stage::InProgress);
}

// ============================================================================
// Title Uniqueness
// ============================================================================

#[rstest]
fn insert_project_translates_unique_violation(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_dup_insert_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&board_project("Shared title")))
        .expect("first insert");

    let result = rt.block_on(repo.insert_project(&board_project("Shared title")));
    assert!(
        matches!(
            result,
            Err(BoardRepositoryError::DuplicateTitle(ref title)) if title == "Shared title"
        ),
        "Expected DuplicateTitle error, got: {result:?}"
    );
}

#[rstest]
fn update_project_translates_unique_violation(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_dup_update_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let keeper = board_project("Keeper");
    let mut other = board_project("Other");

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&keeper))
        .expect("insert keeper");
    rt.block_on(repo.insert_project(&other))
        .expect("insert other");

    other.update_details(
        Title::new("Keeper").expect("valid title"),
        Description::new("Collides").expect("valid description"),
        &DefaultClock,
    );
    let result = rt.block_on(repo.update_project(&other));
    assert!(
        matches!(result, Err(BoardRepositoryError::DuplicateTitle(_))),
        "Expected DuplicateTitle error, got: {result:?}"
    );
}

// ============================================================================
// Ordering Allocation
// ============================================================================

#[rstest]
fn sequential_inserts_never_reuse_sequences(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_seq_alloc_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let project = board_project("Allocation");

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&project))
        .expect("insert project");

    let first = rt
        .block_on(repo.insert_task(project.id(), task_draft("First")))
        .expect("first task");
    let second = rt
        .block_on(repo.insert_task(project.id(), task_draft("Second")))
        .expect("second task");
    assert_eq!((first.order(), first.sequence()), (0, 1));
    assert_eq!((second.order(), second.sequence()), (1, 2));

    // A deleted task frees its order slot but its sequence stays burned.
    assert!(
        rt.block_on(repo.delete_task(project.id(), second.id()))
            .expect("delete task")
    );
    let third = rt
        .block_on(repo.insert_task(project.id(), task_draft("Third")))
        .expect("third task");
    assert_eq!((third.order(), third.sequence()), (1, 3));
}

#[rstest]
fn concurrent_inserts_allocate_gapless_unique_sequences(
    shared_test_cluster: &'static TestCluster,
) {
    const WRITERS: u64 = 8;

    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_concurrent_alloc_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 4).expect("repository setup");

    let project = board_project("Concurrent creates");
    let project_id = project.id();
    let shared = Arc::new(repo);

    let rt = concurrency_runtime();
    rt.block_on(shared.insert_project(&project))
        .expect("insert project");

    // Racing writers must serialize on the project row lock, never observing
    // the same max-sequence snapshot.
    let tasks: Vec<Task> = rt.block_on(async {
        let mut handles = Vec::new();
        for worker in 0..WRITERS {
            let writer = Arc::clone(&shared);
            handles.push(tokio::spawn(async move {
                writer
                    .insert_task(project_id, task_draft(&format!("Racing task {worker}")))
                    .await
            }));
        }

        let mut created = Vec::new();
        for handle in handles {
            created.push(
                handle
                    .await
                    .expect("writer should not panic")
                    .expect("insert succeeds"),
            );
        }
        created
    });

    let sequences: BTreeSet<u64> = tasks.iter().map(Task::sequence).collect();
    let orders: BTreeSet<u32> = tasks.iter().map(Task::order).collect();
    assert_eq!(sequences, (1..=WRITERS).collect());
    assert_eq!(orders, (0..8).collect::<BTreeSet<u32>>());
}

// ============================================================================
// Not-Found Corrections and Cascade
// ============================================================================

#[rstest]
fn update_project_on_missing_reports_not_found(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_update_missing_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let absent = board_project("Never stored");

    let rt = test_runtime();
    let result = rt.block_on(repo.update_project(&absent));
    assert!(
        matches!(result, Err(BoardRepositoryError::ProjectNotFound(_))),
        "Expected ProjectNotFound error, got: {result:?}"
    );
}

#[rstest]
fn find_task_in_missing_project_reports_project_not_found(
    shared_test_cluster: &'static TestCluster,
) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_find_missing_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let rt = test_runtime();
    let result = rt.block_on(repo.find_task(ProjectId::new(), TaskId::new()));
    assert!(
        matches!(result, Err(BoardRepositoryError::ProjectNotFound(_))),
        "Expected ProjectNotFound error, got: {result:?}"
    );
}

#[rstest]
fn delete_project_cascades_to_tasks(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_cascade_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name, 1).expect("repository setup");

    let project = board_project("Cascade");

    let rt = test_runtime();
    rt.block_on(repo.insert_project(&project))
        .expect("insert project");
    let task = rt
        .block_on(repo.insert_task(project.id(), task_draft("Goes with it")))
        .expect("insert task");

    assert!(
        rt.block_on(repo.delete_project(project.id()))
            .expect("delete project")
    );
    assert!(
        !rt.block_on(repo.delete_project(project.id()))
            .expect("second delete")
    );

    let lookup = rt.block_on(repo.find_task(project.id(), task.id()));
    assert!(
        matches!(lookup, Err(BoardRepositoryError::ProjectNotFound(_))),
        "Expected ProjectNotFound error, got: {lookup:?}"
    );
}
