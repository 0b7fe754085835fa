//! Task agent endpoints.
//!
//! ```text
//! POST /api/agent/branch {"taskId"}
//! POST /api/agent        {"taskId","message"}   -> text/plain stream
//! ```

use actix_web::{HttpResponse, post, web};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AgentChatRequest, SuggestBranchRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::DataEnvelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_uuid};

const TASK_ID: FieldName = FieldName::new("taskId");
const STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchBody {
    pub task_id: Option<String>,
}

/// Suggested branch. Field names are snake_case on the wire.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BranchData {
    #[schema(example = "feat: add workspace logo upload")]
    pub commit_message: String,
    #[schema(example = "feature/workspace-logo-upload")]
    pub branch_name: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub task_id: Option<String>,
    /// At most 10 000 characters.
    pub message: Option<String>,
}

/// Suggest a branch name and commit message from the task conversation.
#[utoipa::path(
    post,
    path = "/api/agent/branch",
    request_body = BranchBody,
    responses(
        (status = 200, description = "Suggestion", body = DataEnvelope<BranchData>),
        (status = 400, description = "Invalid task id or no chat history", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "No access to the workspace", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema),
        (status = 500, description = "Model reply unusable", body = ErrorSchema)
    ),
    tags = ["agent"],
    operation_id = "suggestBranch"
)]
#[post("/agent/branch")]
pub async fn suggest_branch(
    user: CurrentUser,
    state: web::Data<HttpState>,
    payload: web::Json<BranchBody>,
) -> ApiResult<web::Json<DataEnvelope<BranchData>>> {
    let task_id = require_uuid(payload.into_inner().task_id, TASK_ID)?;
    let suggestion = state
        .agent
        .suggest_branch(SuggestBranchRequest {
            user_id: user.into_inner(),
            task_id,
        })
        .await?;
    Ok(web::Json(DataEnvelope::ok(BranchData {
        commit_message: suggestion.commit_message,
        branch_name: suggestion.branch_name,
    })))
}

/// Send a message to the task agent and stream the reply as plain text.
///
/// Validation and authorisation failures are JSON errors. Once streaming has
/// started, a model failure aborts the body.
#[utoipa::path(
    post,
    path = "/api/agent",
    request_body = ChatBody,
    responses(
        (status = 200, description = "Reply text, streamed", content_type = "text/plain", body = String),
        (status = 400, description = "Invalid task id or message", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "No write access to the workspace", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["agent"],
    operation_id = "chatWithAgent"
)]
#[post("/agent")]
pub async fn chat(
    user: CurrentUser,
    state: web::Data<HttpState>,
    payload: web::Json<ChatBody>,
) -> ApiResult<HttpResponse> {
    let ChatBody { task_id, message } = payload.into_inner();
    let task_id = require_uuid(task_id, TASK_ID)?;
    let reply = state
        .agent
        .chat(AgentChatRequest {
            user_id: user.into_inner(),
            task_id,
            message: message.unwrap_or_default(),
        })
        .await?;
    let body = reply.map(|chunk| chunk.map(web::Bytes::from));
    Ok(HttpResponse::Ok()
        .content_type(STREAM_CONTENT_TYPE)
        .insert_header((actix_web::http::header::CACHE_CONTROL, "no-cache"))
        .streaming(body))
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
