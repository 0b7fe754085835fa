//! Task agent: branch-name suggestions and streaming chat.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use mockable::Clock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    AgentChatRequest, AgentCommand, AgentReplyStream, ChatMessageRepository,
    ChatMessageRepositoryError, CompletionRequest, LanguageModel, LanguageModelError,
    MAX_AGENT_MESSAGE_CHARS, PromptMessage, SuggestBranchRequest, TaskRepository,
    TextDeltaStream, WorkspaceRepository,
};
use crate::domain::task_service::load_active_task;
use crate::domain::{
    BranchSuggestion, ChatMessage, ChatRole, Error, Permission, Task, UserId, WorkspaceAccess,
};

const BRANCH_SYSTEM_PROMPT: &str = "You name git branches. Read the conversation about a \
software task and reply with a single JSON object of the form \
{\"commit_message\": \"...\", \"branch_name\": \"...\"}. The commit message follows the \
Conventional Commits style. The branch name is short, lower-case, uses '-' between words \
and may use one '/' after a type prefix such as feature/ or fix/. Reply with JSON only.";

const CHAT_SYSTEM_PROMPT: &str = "You are a software engineering assistant helping a team \
complete a task. Answer concisely and include code where it helps.";

const BRANCH_MAX_TOKENS: u32 = 256;
const CHAT_MAX_TOKENS: u32 = 4096;

/// Collaborators of [`AgentService`].
pub struct AgentServicePorts {
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub messages: Arc<dyn ChatMessageRepository>,
    pub model: Arc<dyn LanguageModel>,
    pub clock: Arc<dyn Clock>,
}

/// Service implementing [`AgentCommand`].
#[derive(Clone)]
pub struct AgentService {
    access: WorkspaceAccess,
    tasks: Arc<dyn TaskRepository>,
    messages: Arc<dyn ChatMessageRepository>,
    model: Arc<dyn LanguageModel>,
    clock: Arc<dyn Clock>,
}

impl AgentService {
    pub fn new(ports: AgentServicePorts) -> Self {
        Self {
            access: WorkspaceAccess::new(ports.workspaces),
            tasks: ports.tasks,
            messages: ports.messages,
            model: ports.model,
            clock: ports.clock,
        }
    }

    async fn authorised_task(
        &self,
        task_id: &Uuid,
        user_id: &UserId,
        permission: Permission,
    ) -> Result<Task, Error> {
        let task = load_active_task(self.tasks.as_ref(), task_id).await?;
        let workspace = self.access.by_id(&task.workspace_id).await?;
        self.access.require(&workspace, user_id, permission).await?;
        Ok(task)
    }

    async fn history(&self, task_id: &Uuid) -> Result<Vec<ChatMessage>, Error> {
        self.messages
            .list_for_task(task_id)
            .await
            .map_err(map_chat_error)
    }
}

/// Collapse consecutive turns by the same author; the model expects
/// alternating roles.
fn prompt_messages(history: &[ChatMessage]) -> Vec<PromptMessage> {
    let mut prompt: Vec<PromptMessage> = Vec::with_capacity(history.len());
    for message in history {
        match prompt.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.message);
            }
            _ => prompt.push(PromptMessage {
                role: message.role,
                content: message.message.clone(),
            }),
        }
    }
    prompt
}

fn transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_chat_message(message: &str) -> Result<&str, Error> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request("Missing required field: message")
            .with_details(serde_json::json!({ "field": "message", "code": "missing_field" })));
    }
    if trimmed.chars().count() > MAX_AGENT_MESSAGE_CHARS {
        return Err(Error::invalid_request(format!(
            "message must be at most {MAX_AGENT_MESSAGE_CHARS} characters"
        ))
        .with_details(serde_json::json!({ "field": "message", "code": "too_long" })));
    }
    Ok(trimmed)
}

#[async_trait]
impl AgentCommand for AgentService {
    async fn suggest_branch(
        &self,
        request: SuggestBranchRequest,
    ) -> Result<BranchSuggestion, Error> {
        let task = self
            .authorised_task(&request.task_id, &request.user_id, Permission::Read)
            .await?;
        let history = self.history(&task.id).await?;
        if history.is_empty() {
            return Err(Error::invalid_request(
                "No chat history available for this task",
            ));
        }

        let reply = self
            .model
            .complete(CompletionRequest {
                system: Some(BRANCH_SYSTEM_PROMPT.to_owned()),
                messages: vec![PromptMessage {
                    role: ChatRole::User,
                    content: format!("Task: {}\n\n{}", task.title, transcript(&history)),
                }],
                max_tokens: BRANCH_MAX_TOKENS,
            })
            .await
            .map_err(|err| map_model_error(&err, "Failed to generate branch name"))?;

        let suggestion = BranchSuggestion::from_model_reply(&reply).map_err(|err| {
            warn!(task_id = %task.id, error = %err, "unusable branch suggestion");
            Error::failed("Failed to generate branch name")
        })?;
        debug!(task_id = %task.id, branch = %suggestion.branch_name, "branch suggested");
        Ok(suggestion)
    }

    async fn chat(&self, request: AgentChatRequest) -> Result<AgentReplyStream, Error> {
        let text = validate_chat_message(&request.message)?;
        let task = self
            .authorised_task(&request.task_id, &request.user_id, Permission::Write)
            .await?;

        let mut history = self.history(&task.id).await?;
        let user_message = ChatMessage::new(task.id, ChatRole::User, text, self.clock.utc());
        self.messages
            .append(&user_message)
            .await
            .map_err(map_chat_error)?;
        history.push(user_message);

        let deltas = self
            .model
            .stream(CompletionRequest {
                system: Some(CHAT_SYSTEM_PROMPT.to_owned()),
                messages: prompt_messages(&history),
                max_tokens: CHAT_MAX_TOKENS,
            })
            .await
            .map_err(|err| map_model_error(&err, "Failed to generate response"))?;

        Ok(assistant_reply(ReplyState {
            deltas,
            reply: String::new(),
            task_id: task.id,
            messages: Arc::clone(&self.messages),
            clock: Arc::clone(&self.clock),
            finished: false,
        }))
    }
}

struct ReplyState {
    deltas: TextDeltaStream,
    reply: String,
    task_id: Uuid,
    messages: Arc<dyn ChatMessageRepository>,
    clock: Arc<dyn Clock>,
    finished: bool,
}

/// Forward deltas and persist the full reply once the model finishes.
fn assistant_reply(state: ReplyState) -> AgentReplyStream {
    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        match state.deltas.next().await {
            Some(Ok(delta)) => {
                state.reply.push_str(&delta);
                Some((Ok(delta), state))
            }
            Some(Err(err)) => {
                state.finished = true;
                Some((Err(map_model_error(&err, "Failed to generate response")), state))
            }
            None => {
                state.finished = true;
                let reply = std::mem::take(&mut state.reply);
                let stored = persist_reply(
                    state.task_id,
                    reply,
                    Arc::clone(&state.messages),
                    Arc::clone(&state.clock),
                );
                match stored.await {
                    Ok(()) => None,
                    Err(err) => Some((Err(err), state)),
                }
            }
        }
    })
    .boxed()
}

async fn persist_reply(
    task_id: Uuid,
    reply: String,
    messages: Arc<dyn ChatMessageRepository>,
    clock: Arc<dyn Clock>,
) -> Result<(), Error> {
    if reply.is_empty() {
        warn!(task_id = %task_id, "model returned an empty reply; nothing stored");
        return Ok(());
    }
    let chars = reply.len();
    let message = ChatMessage::new(task_id, ChatRole::Assistant, reply, clock.utc());
    messages.append(&message).await.map_err(map_chat_error)?;
    info!(task_id = %task_id, chars, "assistant reply stored");
    Ok(())
}

fn map_model_error(error: &LanguageModelError, fallback: &str) -> Error {
    warn!(error = %error, "{fallback}");
    Error::failed(fallback)
}

fn map_chat_error(error: ChatMessageRepositoryError) -> Error {
    match error {
        ChatMessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("chat message repository unavailable: {message}"))
        }
        ChatMessageRepositoryError::Query { message } => {
            Error::internal(format!("chat message repository error: {message}"))
        }
    }
}

#[cfg(test)]
#[path = "agent_service_tests.rs"]
mod tests;
