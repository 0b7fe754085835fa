//! In-memory implementations of the repository ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    ChatMessageRepository, ChatMessageRepositoryError, GithubCredentialsRepository,
    GithubCredentialsRepositoryError, SwarmRepository, SwarmRepositoryError, TaskRepository,
    TaskRepositoryError, WorkspaceRepository, WorkspaceRepositoryError,
};
use crate::domain::{
    ChatMessage, GithubCredentials, PoolState, Swarm, Task, UserId, Workspace, WorkspaceRole,
};

struct Membership {
    role: WorkspaceRole,
    left_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Tables {
    workspaces: HashMap<Uuid, Workspace>,
    members: HashMap<(Uuid, Uuid), Membership>,
    tasks: HashMap<Uuid, Task>,
    task_editors: HashMap<Uuid, Uuid>,
    messages: Vec<ChatMessage>,
    swarms: HashMap<Uuid, Swarm>,
    github: HashMap<Uuid, GithubCredentials>,
}

/// Shared tables behind every repository port. Clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(tables) => tables,
            Err(_) => panic!("in-memory store mutex"),
        }
    }

    pub fn insert_workspace(&self, workspace: Workspace) {
        self.lock().workspaces.insert(workspace.id, workspace);
    }

    pub fn add_member(&self, workspace_id: Uuid, user: &UserId, role: WorkspaceRole) {
        self.lock().members.insert(
            (workspace_id, *user.as_uuid()),
            Membership {
                role,
                left_at: None,
            },
        );
    }

    /// Mark a membership as ended; the row stays but grants nothing.
    pub fn remove_member(&self, workspace_id: Uuid, user: &UserId, at: DateTime<Utc>) {
        if let Some(membership) = self
            .lock()
            .members
            .get_mut(&(workspace_id, *user.as_uuid()))
        {
            membership.left_at = Some(at);
        }
    }

    pub fn insert_task(&self, task: Task) {
        self.lock().tasks.insert(task.id, task);
    }

    pub fn insert_message(&self, message: ChatMessage) {
        self.lock().messages.push(message);
    }

    pub fn insert_swarm(&self, swarm: Swarm) {
        self.lock().swarms.insert(swarm.id, swarm);
    }

    pub fn link_github(&self, user: &UserId, credentials: GithubCredentials) {
        self.lock().github.insert(*user.as_uuid(), credentials);
    }

    pub fn workspace(&self, id: &Uuid) -> Option<Workspace> {
        self.lock().workspaces.get(id).cloned()
    }

    pub fn task(&self, id: &Uuid) -> Option<Task> {
        self.lock().tasks.get(id).cloned()
    }

    /// User recorded as the last editor of a task.
    pub fn task_editor(&self, id: &Uuid) -> Option<Uuid> {
        self.lock().task_editors.get(id).copied()
    }

    pub fn messages_for(&self, task_id: &Uuid) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .lock()
            .messages
            .iter()
            .filter(|message| message.task_id == *task_id)
            .cloned()
            .collect();
        messages.sort_by_key(|message| message.created_at);
        messages
    }

    pub fn swarm(&self, id: &Uuid) -> Option<Swarm> {
        self.lock().swarms.get(id).cloned()
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryStore {
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError> {
        Ok(self
            .lock()
            .workspaces
            .values()
            .find(|workspace| workspace.slug == slug && !workspace.deleted)
            .cloned())
    }

    async fn find_active_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError> {
        Ok(self
            .lock()
            .workspaces
            .get(id)
            .filter(|workspace| !workspace.deleted)
            .cloned())
    }

    async fn find_member_role(
        &self,
        workspace_id: &Uuid,
        user_id: &UserId,
    ) -> Result<Option<WorkspaceRole>, WorkspaceRepositoryError> {
        Ok(self
            .lock()
            .members
            .get(&(*workspace_id, *user_id.as_uuid()))
            .filter(|membership| membership.left_at.is_none())
            .map(|membership| membership.role))
    }

    async fn set_logo_key(
        &self,
        workspace_id: &Uuid,
        logo_key: Option<String>,
    ) -> Result<(), WorkspaceRepositoryError> {
        match self.lock().workspaces.get_mut(workspace_id) {
            Some(workspace) => {
                workspace.logo_key = logo_key;
                Ok(())
            }
            None => Err(WorkspaceRepositoryError::query("workspace missing")),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn find_active(&self, task_id: &Uuid) -> Result<Option<Task>, TaskRepositoryError> {
        Ok(self
            .lock()
            .tasks
            .get(task_id)
            .filter(|task| !task.deleted)
            .cloned())
    }

    async fn soft_delete(
        &self,
        task_id: &Uuid,
        deleted_by: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError> {
        let mut tables = self.lock();
        let task = tables
            .tasks
            .get_mut(task_id)
            .filter(|task| !task.deleted)
            .ok_or_else(|| TaskRepositoryError::query("task missing"))?;
        task.deleted = true;
        task.deleted_at = Some(at);
        tables.task_editors.insert(*task_id, *deleted_by.as_uuid());
        Ok(())
    }
}

#[async_trait]
impl ChatMessageRepository for InMemoryStore {
    async fn list_for_task(
        &self,
        task_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, ChatMessageRepositoryError> {
        Ok(self.messages_for(task_id))
    }

    async fn append(&self, message: &ChatMessage) -> Result<(), ChatMessageRepositoryError> {
        self.lock().messages.push(message.clone());
        Ok(())
    }
}

#[async_trait]
impl SwarmRepository for InMemoryStore {
    async fn find_by_swarm_id(
        &self,
        swarm_id: &str,
    ) -> Result<Option<Swarm>, SwarmRepositoryError> {
        Ok(self
            .lock()
            .swarms
            .values()
            .find(|swarm| swarm.swarm_id.as_deref() == Some(swarm_id))
            .cloned())
    }

    async fn find_by_workspace(
        &self,
        workspace_id: &Uuid,
    ) -> Result<Option<Swarm>, SwarmRepositoryError> {
        Ok(self
            .lock()
            .swarms
            .values()
            .find(|swarm| swarm.workspace_id == *workspace_id)
            .cloned())
    }

    async fn update_pool_state(
        &self,
        id: &Uuid,
        state: PoolState,
        pool_name: Option<String>,
    ) -> Result<(), SwarmRepositoryError> {
        let mut tables = self.lock();
        let swarm = tables
            .swarms
            .get_mut(id)
            .ok_or_else(|| SwarmRepositoryError::query("swarm missing"))?;
        swarm.pool_state = state;
        if pool_name.is_some() {
            swarm.pool_name = pool_name;
        }
        Ok(())
    }
}

#[async_trait]
impl GithubCredentialsRepository for InMemoryStore {
    async fn find_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GithubCredentials>, GithubCredentialsRepositoryError> {
        Ok(self.lock().github.get(user_id.as_uuid()).cloned())
    }
}
