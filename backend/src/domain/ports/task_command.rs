//! Driving port for task mutations.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, UserId};

/// Request to soft-delete a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskRequest {
    pub user_id: UserId,
    pub task_id: Uuid,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCommand: Send + Sync {
    /// Soft-delete a task the caller may write to.
    async fn delete_task(&self, request: DeleteTaskRequest) -> Result<(), Error>;
}
