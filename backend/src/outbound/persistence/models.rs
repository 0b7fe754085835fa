//! Internal Diesel row structs and their conversion into domain types.
//!
//! Rows never leave the persistence layer. Conversions fail with a message
//! when stored text or JSON no longer matches the domain's expectations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    ChatMessage, ChatRole, EncryptedField, PoolState, Swarm, SwarmEnvVar, Task, Workspace,
};

use super::schema::{chat_messages, swarms, tasks, users, workspaces};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workspaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WorkspaceRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
    pub logo_key: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            owner_id: row.owner_id,
            logo_key: row.logo_key,
            deleted: row.deleted,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaskRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub status: String,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            title: row.title,
            status: row.status,
            deleted: row.deleted,
            deleted_at: row.deleted_at,
        }
    }
}

/// Soft-delete changeset for tasks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub(crate) struct TaskDeletion {
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_by_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatMessageRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub role: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
    type Error = String;

    fn try_from(row: ChatMessageRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<ChatRole>()
            .map_err(|err| format!("chat message {}: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            task_id: row.task_id,
            role,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub(crate) struct NewChatMessageRow<'a> {
    pub id: Uuid,
    pub task_id: Uuid,
    pub role: &'a str,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a ChatMessage> for NewChatMessageRow<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            id: message.id,
            task_id: message.task_id,
            role: message.role.as_str(),
            message: &message.message,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = swarms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SwarmRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub swarm_id: Option<String>,
    pub name: String,
    pub pool_name: Option<String>,
    pub pool_api_key: Option<Value>,
    pub pool_state: String,
    pub repository_url: Option<String>,
    pub default_branch: Option<String>,
    pub environment_variables: Value,
}

impl TryFrom<SwarmRow> for Swarm {
    type Error = String;

    fn try_from(row: SwarmRow) -> Result<Self, Self::Error> {
        let pool_api_key = row
            .pool_api_key
            .map(serde_json::from_value::<EncryptedField>)
            .transpose()
            .map_err(|err| format!("swarm {} pool_api_key: {err}", row.id))?;
        let environment_variables =
            serde_json::from_value::<Vec<SwarmEnvVar>>(row.environment_variables)
                .map_err(|err| format!("swarm {} environment_variables: {err}", row.id))?;
        let pool_state = row
            .pool_state
            .parse::<PoolState>()
            .map_err(|err| format!("swarm {}: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            workspace_id: row.workspace_id,
            swarm_id: row.swarm_id,
            name: row.name,
            pool_name: row.pool_name,
            pool_api_key,
            pool_state,
            repository_url: row.repository_url,
            default_branch: row.default_branch,
            environment_variables,
        })
    }
}

/// Pool outcome changeset; a `None` pool name leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = swarms)]
pub(crate) struct PoolStateUpdate<'a> {
    pub pool_state: &'a str,
    pub pool_name: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GithubCredentialsRow {
    pub github_username: Option<String>,
    pub github_token: Option<Value>,
}
