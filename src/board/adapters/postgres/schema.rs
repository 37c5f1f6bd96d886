//! Diesel schema for board persistence.

diesel::table! {
    /// Project records.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Project title, unique across all projects.
        #[max_length = 30]
        title -> Varchar,
        /// Project description.
        description -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records, each owned by exactly one project.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Uuid,
        /// Task title.
        #[max_length = 30]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Scheduled start date.
        start_date -> Timestamptz,
        /// Scheduled end date.
        end_date -> Timestamptz,
        /// Workflow stage label.
        #[max_length = 20]
        stage -> Varchar,
        /// Display order within the project at allocation time.
        display_order -> Int4,
        /// Per-project creation sequence number, never reused.
        sequence -> Int8,
        /// Attachment list payload.
        attachments -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, tasks);
