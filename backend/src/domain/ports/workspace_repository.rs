//! Port for workspace lookups, membership roles, and logo keys.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{UserId, Workspace, WorkspaceRole};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by workspace repository adapters.
    pub enum WorkspaceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "workspace repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "workspace repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Fetch a workspace that has not been soft-deleted, by slug.
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError>;

    /// Fetch a workspace that has not been soft-deleted, by id.
    async fn find_active_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError>;

    /// Role of a current (not departed) member; `None` when not a member.
    async fn find_member_role(
        &self,
        workspace_id: &Uuid,
        user_id: &UserId,
    ) -> Result<Option<WorkspaceRole>, WorkspaceRepositoryError>;

    /// Replace or clear the stored logo object key.
    async fn set_logo_key(
        &self,
        workspace_id: &Uuid,
        logo_key: Option<String>,
    ) -> Result<(), WorkspaceRepositoryError>;
}
