//! Driving port for pool provisioning and pod claims.
use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, UserId};

use super::PoolSummary;

/// How the caller identified the swarm whose pool should be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwarmSelector {
    /// External swarm identifier.
    SwarmId(String),
    /// Owning workspace.
    Workspace(Uuid),
}

/// Request to provision the pool of a swarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolRequest {
    pub user_id: UserId,
    pub swarm: SwarmSelector,
    /// File name to content, copied into pool containers.
    pub container_files: BTreeMap<String, String>,
}

/// Request to claim a pod for a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPodRequest {
    pub user_id: UserId,
    pub workspace_id: Uuid,
}

/// Claimed pod as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPodResponse {
    pub workspace_id: Uuid,
    /// Public URL of the pod's frontend.
    pub frontend: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolCommand: Send + Sync {
    /// Provision the pool, retrying failures, and record the outcome.
    async fn create_pool(&self, request: CreatePoolRequest) -> Result<PoolSummary, Error>;

    /// Claim a pod and pick its frontend URL.
    async fn claim_pod(&self, request: ClaimPodRequest) -> Result<ClaimPodResponse, Error>;
}
