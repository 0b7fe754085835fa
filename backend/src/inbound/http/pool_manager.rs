//! Pool Manager endpoints.
//!
//! ```text
//! POST /api/pool-manager/create-pool {"swarmId"?, "workspaceId"?, "containerFiles"?}
//! POST /api/pool-manager/claim-pod/{workspaceId}
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{ClaimPodRequest, CreatePoolRequest, PoolSummary, SwarmSelector};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::DataEnvelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const WORKSPACE_ID: FieldName = FieldName::new("workspaceId");

/// Body of `POST /api/pool-manager/create-pool`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolBody {
    /// External swarm identifier; preferred over `workspaceId`.
    pub swarm_id: Option<String>,
    pub workspace_id: Option<String>,
    /// File name to content, copied into every pool container.
    #[serde(default)]
    pub container_files: BTreeMap<String, String>,
}

impl CreatePoolBody {
    fn selector(&self) -> Result<SwarmSelector, Error> {
        let swarm_id = self
            .swarm_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if let Some(id) = swarm_id {
            return Ok(SwarmSelector::SwarmId(id.to_owned()));
        }
        match self.workspace_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(raw) => parse_uuid(raw, WORKSPACE_ID).map(SwarmSelector::Workspace),
            None => Err(Error::invalid_request(
                "Missing required field: swarmId or workspaceId",
            )
            .with_details(serde_json::json!({
                "fields": ["swarmId", "workspaceId"],
                "code": "missing_field",
            }))),
        }
    }
}

/// Provisioned pool as returned by the Pool Manager.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolData {
    #[schema(value_type = Object)]
    pub pool: PoolSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimedWorkspace {
    pub id: Uuid,
}

/// Body of a successful claim.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimPodResponseBody {
    pub success: bool,
    #[schema(example = "Pod claimed successfully")]
    pub message: String,
    /// Public URL of the pod's frontend.
    pub frontend: String,
    pub workspace: ClaimedWorkspace,
}

/// Provision the pool of a swarm.
///
/// Failed attempts are retried. Errors reported by the Pool Manager keep its
/// status and carry `service: "poolManager"`.
#[utoipa::path(
    post,
    path = "/api/pool-manager/create-pool",
    request_body = CreatePoolBody,
    responses(
        (status = 201, description = "Pool created", body = DataEnvelope<PoolData>),
        (status = 400, description = "No swarm selector or missing pool API key", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owner or admin role required", body = ErrorSchema),
        (status = 404, description = "Swarm or workspace not found", body = ErrorSchema),
        (status = 500, description = "Failed to create pool", body = ErrorSchema)
    ),
    tags = ["pool-manager"],
    operation_id = "createPool"
)]
#[post("/pool-manager/create-pool")]
pub async fn create_pool(
    user: CurrentUser,
    state: web::Data<HttpState>,
    payload: web::Json<CreatePoolBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let swarm = body.selector()?;
    let pool = state
        .pools
        .create_pool(CreatePoolRequest {
            user_id: user.into_inner(),
            swarm,
            container_files: body.container_files,
        })
        .await?;
    Ok(HttpResponse::Created().json(DataEnvelope::ok(PoolData { pool })))
}

/// Claim a pod for a workspace and report its frontend URL.
#[utoipa::path(
    post,
    path = "/api/pool-manager/claim-pod/{workspaceId}",
    params(("workspaceId" = String, Path, description = "Workspace identifier (UUID)")),
    responses(
        (status = 200, description = "Pod claimed", body = ClaimPodResponseBody),
        (status = 400, description = "Invalid id or swarm without pool information", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "No access to the workspace", body = ErrorSchema),
        (status = 404, description = "Workspace or swarm not found", body = ErrorSchema),
        (status = 500, description = "No frontend available", body = ErrorSchema)
    ),
    tags = ["pool-manager"],
    operation_id = "claimPod"
)]
#[post("/pool-manager/claim-pod/{workspace_id}")]
pub async fn claim_pod(
    user: CurrentUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClaimPodResponseBody>> {
    let workspace_id = parse_uuid(&path.into_inner(), WORKSPACE_ID)?;
    let claimed = state
        .pools
        .claim_pod(ClaimPodRequest {
            user_id: user.into_inner(),
            workspace_id,
        })
        .await?;
    Ok(web::Json(ClaimPodResponseBody {
        success: true,
        message: "Pod claimed successfully".to_owned(),
        frontend: claimed.frontend,
        workspace: ClaimedWorkspace {
            id: claimed.workspace_id,
        },
    }))
}

#[cfg(test)]
#[path = "pool_manager_tests.rs"]
mod tests;
