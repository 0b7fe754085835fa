//! Port for the hosted language model used by the task agent.
use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::ChatRole;

use super::define_port_error;

define_port_error! {
    /// Failures raised by language model adapters.
    pub enum LanguageModelError {
        /// The provider answered with a non-success status.
        Api { status: u16, message: String } => "language model returned {status}: {message}",
        /// The provider could not be reached or the stream broke.
        Transport { message: String } => "language model request failed: {message}",
        /// The provider's reply could not be decoded.
        Decode { message: String } => "language model reply malformed: {message}",
    }
}

/// One prior turn passed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Completion request independent of any provider wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instructions.
    pub system: Option<String>,
    /// Conversation, oldest first.
    pub messages: Vec<PromptMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Incremental text produced by a streaming completion.
pub type TextDeltaStream = BoxStream<'static, Result<String, LanguageModelError>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a full reply.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LanguageModelError>;

    /// Start a streaming reply; resolves once the provider accepted the request.
    async fn stream(&self, request: CompletionRequest)
    -> Result<TextDeltaStream, LanguageModelError>;
}
