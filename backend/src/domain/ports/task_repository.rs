//! Port abstraction for task persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Task, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by task repository adapters.
    pub enum TaskRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "task repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch a task unless it has been soft-deleted.
    async fn find_active(&self, task_id: &Uuid) -> Result<Option<Task>, TaskRepositoryError>;

    /// Flag the task as deleted and record who deleted it.
    async fn soft_delete(
        &self,
        task_id: &Uuid,
        deleted_by: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError>;
}
