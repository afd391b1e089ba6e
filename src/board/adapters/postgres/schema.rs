//! Diesel schema for board persistence.

diesel::table! {
    /// Task records for the board.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Status column the task belongs to.
        #[max_length = 50]
        status -> Varchar,
        /// Priority level.
        #[max_length = 50]
        priority -> Varchar,
        /// Optional assignee user reference.
        assignee_id -> Nullable<Uuid>,
        /// Creating user reference.
        creator_id -> Uuid,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Zero-based position within the persisted global ordering.
        rank -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tag rows, one per tag occurrence on a task.
    task_tags (id) {
        /// Surrogate row identifier.
        id -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Tag value. Duplicates are permitted.
        #[max_length = 255]
        tag -> Varchar,
        /// Zero-based position within the task's tag list.
        position -> Int4,
    }
}

diesel::table! {
    /// Append-only task comments.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Authoring user reference.
        author_id -> Uuid,
        /// Comment body.
        content -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directory rows mirrored from the collaborator service.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Optional display name.
        #[max_length = 255]
        name -> Nullable<Varchar>,
        /// Email address.
        #[max_length = 255]
        email -> Varchar,
        /// Reported presence state.
        #[max_length = 50]
        presence -> Varchar,
        /// Optional last-seen timestamp.
        last_seen -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(task_tags -> tasks (task_id));
diesel::joinable!(task_comments -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, task_tags, task_comments, users);
