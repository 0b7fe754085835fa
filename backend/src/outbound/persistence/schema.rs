//! Diesel table definitions; must match `backend/migrations`.

diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        email -> Nullable<Text>,
        github_username -> Nullable<Text>,
        /// Encrypted field envelope.
        github_token -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    workspaces (id) {
        id -> Uuid,
        name -> Text,
        slug -> Text,
        owner_id -> Uuid,
        logo_key -> Nullable<Text>,
        deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Owners are implied by `workspaces.owner_id` and never stored here.
    workspace_members (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        user_id -> Uuid,
        role -> Text,
        joined_at -> Timestamptz,
        /// Set when the member leaves; such rows grant nothing.
        left_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    tasks (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        title -> Text,
        status -> Text,
        deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_by_id -> Uuid,
        updated_by_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    chat_messages (id) {
        id -> Uuid,
        task_id -> Uuid,
        role -> Text,
        message -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    swarms (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        swarm_id -> Nullable<Text>,
        name -> Text,
        pool_name -> Nullable<Text>,
        pool_api_key -> Nullable<Jsonb>,
        pool_state -> Text,
        repository_url -> Nullable<Text>,
        default_branch -> Nullable<Text>,
        environment_variables -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(workspaces -> users (owner_id));
diesel::joinable!(workspace_members -> workspaces (workspace_id));
diesel::joinable!(tasks -> workspaces (workspace_id));
diesel::joinable!(chat_messages -> tasks (task_id));
diesel::joinable!(swarms -> workspaces (workspace_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    workspaces,
    workspace_members,
    tasks,
    chat_messages,
    swarms,
);
