//! Driving port for the task agent.
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use uuid::Uuid;

use crate::domain::{BranchSuggestion, Error, UserId};

/// Longest chat message accepted from a user, in characters.
pub const MAX_AGENT_MESSAGE_CHARS: usize = 10_000;

/// Request for a branch name and commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestBranchRequest {
    pub user_id: UserId,
    pub task_id: Uuid,
}

/// New user turn in a task conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentChatRequest {
    pub user_id: UserId,
    pub task_id: Uuid,
    pub message: String,
}

/// Reply text as it is generated.
pub type AgentReplyStream = BoxStream<'static, Result<String, Error>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentCommand: Send + Sync {
    /// Derive a branch name and commit message from the task conversation.
    async fn suggest_branch(&self, request: SuggestBranchRequest)
    -> Result<BranchSuggestion, Error>;

    /// Record the user turn and stream the assistant reply.
    async fn chat(&self, request: AgentChatRequest) -> Result<AgentReplyStream, Error>;
}
