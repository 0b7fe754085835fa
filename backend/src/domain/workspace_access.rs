//! Workspace resolution and role checks shared by the domain services.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{WorkspaceRepository, WorkspaceRepositoryError};
use crate::domain::{Error, Permission, UserId, Workspace, WorkspaceRole, authorize};

/// Resolves workspaces and the caller's role within them.
#[derive(Clone)]
pub struct WorkspaceAccess {
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl WorkspaceAccess {
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>) -> Self {
        Self { workspaces }
    }

    /// Underlying repository, for mutations beyond access checks.
    pub fn repository(&self) -> &dyn WorkspaceRepository {
        self.workspaces.as_ref()
    }

    /// Active workspace by slug, or 404.
    pub async fn by_slug(&self, slug: &str) -> Result<Workspace, Error> {
        self.workspaces
            .find_active_by_slug(slug)
            .await
            .map_err(map_workspace_error)?
            .ok_or_else(|| Error::not_found("Workspace not found"))
    }

    /// Active workspace by id, or 404.
    pub async fn by_id(&self, id: &Uuid) -> Result<Workspace, Error> {
        self.workspaces
            .find_active_by_id(id)
            .await
            .map_err(map_workspace_error)?
            .ok_or_else(|| Error::not_found("Workspace not found"))
    }

    /// Owner role for the owner, else the active membership role.
    pub async fn role_of(
        &self,
        workspace: &Workspace,
        user_id: &UserId,
    ) -> Result<Option<WorkspaceRole>, Error> {
        if workspace.is_owned_by(user_id) {
            return Ok(Some(WorkspaceRole::Owner));
        }
        self.workspaces
            .find_member_role(&workspace.id, user_id)
            .await
            .map_err(map_workspace_error)
    }

    /// Resolve the caller's role and check it grants `permission`.
    pub async fn require(
        &self,
        workspace: &Workspace,
        user_id: &UserId,
        permission: Permission,
    ) -> Result<WorkspaceRole, Error> {
        let role = self.role_of(workspace, user_id).await?;
        authorize(role, permission)
    }
}

pub(crate) fn map_workspace_error(error: WorkspaceRepositoryError) -> Error {
    match error {
        WorkspaceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("workspace repository unavailable: {message}"))
        }
        WorkspaceRepositoryError::Query { message } => {
            Error::internal(format!("workspace repository error: {message}"))
        }
    }
}
