//! Port abstraction for a task's chat history.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ChatMessage;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by chat message repository adapters.
    pub enum ChatMessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "chat message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "chat message repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    /// Messages for the task, oldest first.
    async fn list_for_task(
        &self,
        task_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, ChatMessageRepositoryError>;

    /// Append one message.
    async fn append(&self, message: &ChatMessage) -> Result<(), ChatMessageRepositoryError>;
}
