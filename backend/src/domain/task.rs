//! Tasks and their agent chat transcripts.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A unit of work inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Primary key.
    pub id: Uuid,
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Short summary.
    pub title: String,
    /// Workflow status as stored (e.g. `TODO`, `IN_PROGRESS`, `DONE`).
    pub status: String,
    /// Soft-delete marker.
    pub deleted: bool,
    /// When the task was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Message typed by a workspace member.
    User,
    /// Reply produced by the language model.
    Assistant,
}

impl ChatRole {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }
}

/// Rejection for unknown stored chat roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chat role: {0}")]
pub struct UnknownChatRole(pub String);

impl FromStr for ChatRole {
    type Err = UnknownChatRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ASSISTANT" => Ok(Self::Assistant),
            other => Err(UnknownChatRole(other.to_owned())),
        }
    }
}

/// One turn of the conversation attached to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Primary key.
    pub id: Uuid,
    /// Task the conversation belongs to.
    pub task_id: Uuid,
    /// Author.
    pub role: ChatRole,
    /// Message text.
    pub message: String,
    /// Creation time; transcripts are ordered by it.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a new message with a fresh id.
    pub fn new(task_id: Uuid, role: ChatRole, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            role,
            message: message.into(),
            created_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_roles_round_trip() {
        for role in [ChatRole::User, ChatRole::Assistant] {
            assert_eq!(role.as_str().parse::<ChatRole>(), Ok(role));
        }
        assert!("SYSTEM".parse::<ChatRole>().is_err());
    }
}
