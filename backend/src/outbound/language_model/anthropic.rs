//! Anthropic Messages API adapter for the `LanguageModel` port.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::sse::SseDecoder;
use crate::domain::ChatRole;
use crate::domain::ports::{
    CompletionRequest, LanguageModel, LanguageModelError, PromptMessage, TextDeltaStream,
};
use crate::outbound::http_body::body_preview;

/// Current Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// Connection settings for the Messages API.
#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: Zeroizing<String>,
    /// API root, e.g. `https://api.anthropic.com`.
    pub base_url: Url,
    /// Model identifier sent with every request.
    pub model: String,
    /// Connect timeout, and total timeout for non-streaming calls.
    pub timeout: Duration,
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequestDto<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<MessageDto<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct MessageDto<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a PromptMessage> for MessageDto<'a> {
    fn from(message: &'a PromptMessage) -> Self {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponseDto {
    #[serde(default)]
    content: Vec<ContentBlockDto>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockDto {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponseDto {
    error: ApiErrorDto,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDto {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEventDto {
    ContentBlockDelta { delta: DeltaDto },
    MessageStop,
    Error { error: ApiErrorDto },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DeltaDto {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

/// Claude models through the Anthropic Messages API.
pub struct AnthropicLanguageModel {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicLanguageModel {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AnthropicConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> Result<Url, LanguageModelError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                LanguageModelError::transport(format!(
                    "base URL {} cannot hold a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v1", "messages"]);
        Ok(url)
    }

    async fn post(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<Response, LanguageModelError> {
        let body = MessagesRequestDto {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: request.messages.iter().map(MessageDto::from).collect(),
            stream,
        };
        let mut builder = self
            .client
            .post(self.messages_url()?)
            .header("x-api-key", self.config.api_key.as_str())
            .header("anthropic-version", API_VERSION)
            .json(&body);
        if !stream {
            builder = builder.timeout(self.config.timeout);
        }
        debug!(model = %self.config.model, stream, turns = body.messages.len(), "calling language model");

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status.as_u16(), bytes.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> LanguageModelError {
    LanguageModelError::transport(error.to_string())
}

fn map_status_error(status: u16, body: &[u8]) -> LanguageModelError {
    match serde_json::from_slice::<ApiErrorResponseDto>(body) {
        Ok(dto) => LanguageModelError::api(status, format!("{}: {}", dto.error.kind, dto.error.message)),
        Err(_) => LanguageModelError::api(status, body_preview(body)),
    }
}

/// What a single stream event contributes to the reply.
enum Step {
    Text(String),
    Stop,
    Skip,
}

fn interpret(data: &str) -> Result<Step, LanguageModelError> {
    let event: StreamEventDto = serde_json::from_str(data)
        .map_err(|err| LanguageModelError::decode(format!("invalid stream event: {err}")))?;
    Ok(match event {
        StreamEventDto::ContentBlockDelta {
            delta: DeltaDto::TextDelta { text },
        } => Step::Text(text),
        StreamEventDto::MessageStop => Step::Stop,
        StreamEventDto::Error { error } => {
            return Err(LanguageModelError::transport(format!(
                "{}: {}",
                error.kind, error.message
            )));
        }
        StreamEventDto::ContentBlockDelta { .. } | StreamEventDto::Other => Step::Skip,
    })
}

struct DeltaState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    finished: bool,
}

/// Turn an SSE body into text deltas, ending at `message_stop`.
///
/// Errors end the stream after being yielded once.
fn text_deltas(state: DeltaState) -> TextDeltaStream {
    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }
            if let Some(event) = state.decoder.next_event() {
                match interpret(&event.data) {
                    Ok(Step::Text(text)) if text.is_empty() => continue,
                    Ok(Step::Text(text)) => return Some((Ok(text), state)),
                    Ok(Step::Stop) => return None,
                    Ok(Step::Skip) => continue,
                    Err(err) => {
                        state.finished = true;
                        return Some((Err(err), state));
                    }
                }
            }
            match state.body.next().await {
                Some(Ok(chunk)) => state.decoder.push(&chunk),
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(map_transport_error(err)), state));
                }
                None => {
                    warn!("language model stream closed before message_stop");
                    state.finished = true;
                    return Some((
                        Err(LanguageModelError::transport(
                            "stream ended before message_stop",
                        )),
                        state,
                    ));
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl LanguageModel for AnthropicLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LanguageModelError> {
        let response = self.post(&request, false).await?;
        let body: MessagesResponseDto = response
            .json()
            .await
            .map_err(|err| LanguageModelError::decode(err.to_string()))?;
        let text = body
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlockDto::Text { text } => Some(text),
                ContentBlockDto::Other => None,
            })
            .collect::<String>();
        if text.is_empty() {
            return Err(LanguageModelError::decode("reply contained no text"));
        }
        Ok(text)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextDeltaStream, LanguageModelError> {
        let response = self.post(&request, true).await?;
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(text_deltas(DeltaState {
            body,
            decoder: SseDecoder::default(),
            finished: false,
        }))
    }
}
