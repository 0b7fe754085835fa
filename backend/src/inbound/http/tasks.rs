//! Task endpoints.
//!
//! ```text
//! DELETE /api/tasks/{taskId}
//! ```

use actix_web::{delete, web};

use crate::domain::ports::DeleteTaskRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::MessageEnvelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const TASK_ID: FieldName = FieldName::new("taskId");

/// Soft-delete a task.
#[utoipa::path(
    delete,
    path = "/api/tasks/{taskId}",
    params(("taskId" = String, Path, description = "Task identifier (UUID)")),
    responses(
        (status = 200, description = "Task deleted", body = MessageEnvelope),
        (status = 400, description = "Invalid task id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "No write access to the workspace", body = ErrorSchema),
        (status = 404, description = "Task or workspace not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/tasks/{task_id}")]
pub async fn delete_task(
    user: CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    let task_id = parse_uuid(&path.into_inner(), TASK_ID)?;
    state
        .tasks
        .delete_task(DeleteTaskRequest {
            user_id: user.into_inner(),
            task_id,
        })
        .await?;
    Ok(web::Json(MessageEnvelope::ok("Task deleted successfully")))
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
