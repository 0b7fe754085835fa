//! Port for the external Pool Manager that provisions pods.
//!
//! Requests carry plaintext secrets, so they hold them in zeroizing buffers
//! and redact them from `Debug` output.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::domain::ClaimedPod;

use super::define_port_error;

/// Service name attached to errors passed through from the Pool Manager.
pub const POOL_MANAGER_SERVICE: &str = "poolManager";

define_port_error! {
    /// Failures raised by Pool Manager adapters.
    pub enum PoolManagerError {
        /// The Pool Manager answered with a non-success status.
        Api { status: u16, message: String, details: Option<Value> } =>
            "pool manager returned {status}: {message}",
        /// The Pool Manager could not be reached.
        Transport { message: String } => "pool manager request failed: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "pool manager response malformed: {message}",
    }
}

/// Container environment variable with its plaintext value.
#[derive(Clone, Serialize)]
pub struct PoolEnvVar {
    /// Variable name.
    pub name: String,
    /// Plaintext value.
    #[serde(serialize_with = "serialize_secret")]
    pub value: Zeroizing<String>,
}

impl fmt::Debug for PoolEnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolEnvVar")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Body of the Pool Manager `createPool` operation.
#[derive(Clone, Serialize)]
pub struct CreatePoolPayload {
    pub pool_name: String,
    pub minimum_vms: u32,
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    #[serde(serialize_with = "serialize_optional_secret")]
    pub github_pat: Option<Zeroizing<String>>,
    pub github_username: Option<String>,
    pub env_vars: Vec<PoolEnvVar>,
    pub container_files: BTreeMap<String, String>,
}

impl fmt::Debug for CreatePoolPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatePoolPayload")
            .field("pool_name", &self.pool_name)
            .field("minimum_vms", &self.minimum_vms)
            .field("repo_name", &self.repo_name)
            .field("branch_name", &self.branch_name)
            .field("github_pat", &self.github_pat.as_ref().map(|_| "<redacted>"))
            .field("github_username", &self.github_username)
            .field("env_vars", &self.env_vars)
            .field("container_files", &self.container_files.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    value: &Zeroizing<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_str())
}

fn serialize_optional_secret<S: serde::Serializer>(
    value: &Option<Zeroizing<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(secret) => serializer.serialize_some(secret.as_str()),
        None => serializer.serialize_none(),
    }
}

/// Pool as reported back by the Pool Manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    /// Pool identifier, when the Pool Manager returns one.
    pub id: Option<String>,
    /// Pool name.
    pub name: String,
    /// Remaining fields of the Pool Manager response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolManager: Send + Sync {
    /// Create a pool. Authenticated with the swarm's API key.
    async fn create_pool(
        &self,
        api_key: &str,
        payload: &CreatePoolPayload,
    ) -> Result<PoolSummary, PoolManagerError>;

    /// Claim a pod from an existing pool for a workspace.
    async fn claim_pod(&self, api_key: &str, pool_name: &str)
    -> Result<ClaimedPod, PoolManagerError>;
}
