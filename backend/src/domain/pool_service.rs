//! Pool provisioning and pod claims against the Pool Manager.
//!
//! Secrets are decrypted only for the duration of a call and live in
//! zeroizing buffers. Pool creation retries with a fixed delay and records
//! the outcome on the swarm.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    ClaimPodRequest, ClaimPodResponse, CreatePoolPayload, CreatePoolRequest, FieldCipher,
    FieldCipherError, GithubCredentialsRepository, GithubCredentialsRepositoryError,
    POOL_MANAGER_SERVICE, PoolCommand, PoolEnvVar, PoolManager, PoolManagerError, PoolSummary,
    SwarmRepository, SwarmRepositoryError, SwarmSelector, WorkspaceRepository,
};
use crate::domain::{
    EncryptedField, Error, FixedRetryPolicy, Permission, PoolState, SecretKind, Sleeper, Swarm,
    UserId, WorkspaceAccess,
};

/// Minimum VM count requested for new pools.
pub const DEFAULT_MINIMUM_VMS: u32 = 2;

/// Collaborators of [`PoolService`].
pub struct PoolServicePorts {
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub swarms: Arc<dyn SwarmRepository>,
    pub github_credentials: Arc<dyn GithubCredentialsRepository>,
    pub pool_manager: Arc<dyn PoolManager>,
    pub cipher: Arc<dyn FieldCipher>,
    pub sleeper: Arc<dyn Sleeper>,
}

/// Service implementing [`PoolCommand`].
#[derive(Clone)]
pub struct PoolService {
    access: WorkspaceAccess,
    swarms: Arc<dyn SwarmRepository>,
    github_credentials: Arc<dyn GithubCredentialsRepository>,
    pool_manager: Arc<dyn PoolManager>,
    cipher: Arc<dyn FieldCipher>,
    sleeper: Arc<dyn Sleeper>,
    retry: FixedRetryPolicy,
    minimum_vms: u32,
}

impl PoolService {
    pub fn new(ports: PoolServicePorts) -> Self {
        Self {
            access: WorkspaceAccess::new(ports.workspaces),
            swarms: ports.swarms,
            github_credentials: ports.github_credentials,
            pool_manager: ports.pool_manager,
            cipher: ports.cipher,
            sleeper: ports.sleeper,
            retry: FixedRetryPolicy::pool_creation(),
            minimum_vms: DEFAULT_MINIMUM_VMS,
        }
    }

    /// Override the minimum VM count sent with new pools.
    pub fn with_minimum_vms(mut self, minimum_vms: u32) -> Self {
        self.minimum_vms = minimum_vms;
        self
    }

    fn decrypt(&self, kind: SecretKind, field: &EncryptedField) -> Result<Zeroizing<String>, Error> {
        self.cipher
            .decrypt(kind, field)
            .map_err(|err| map_cipher_error(kind, &err))
    }

    async fn find_swarm(&self, selector: &SwarmSelector) -> Result<Option<Swarm>, Error> {
        let found = match selector {
            SwarmSelector::SwarmId(swarm_id) => self.swarms.find_by_swarm_id(swarm_id).await,
            SwarmSelector::Workspace(workspace_id) => {
                self.swarms.find_by_workspace(workspace_id).await
            }
        };
        found.map_err(map_swarm_error)
    }

    async fn build_payload(
        &self,
        swarm: &Swarm,
        user_id: &UserId,
        container_files: std::collections::BTreeMap<String, String>,
    ) -> Result<CreatePoolPayload, Error> {
        let credentials = self
            .github_credentials
            .find_for_user(user_id)
            .await
            .map_err(map_credentials_error)?;
        let (github_username, github_pat) = match credentials {
            Some(credentials) => (
                Some(credentials.username),
                Some(self.decrypt(SecretKind::GithubToken, &credentials.token)?),
            ),
            None => (None, None),
        };

        let env_vars = swarm
            .environment_variables
            .iter()
            .map(|var| {
                Ok(PoolEnvVar {
                    name: var.name.clone(),
                    value: self.decrypt(SecretKind::EnvironmentVariable, &var.value)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(CreatePoolPayload {
            pool_name: swarm.provisioning_pool_name(),
            minimum_vms: self.minimum_vms,
            repo_name: swarm.repository_name(),
            branch_name: swarm.default_branch.clone(),
            github_pat,
            github_username,
            env_vars,
            container_files,
        })
    }

    async fn record_outcome(
        &self,
        swarm: &Swarm,
        state: PoolState,
        pool_name: Option<String>,
    ) -> Result<(), Error> {
        self.swarms
            .update_pool_state(&swarm.id, state, pool_name)
            .await
            .map_err(map_swarm_error)
    }
}

#[async_trait]
impl PoolCommand for PoolService {
    async fn create_pool(&self, request: CreatePoolRequest) -> Result<PoolSummary, Error> {
        let swarm = self
            .find_swarm(&request.swarm)
            .await?
            .ok_or_else(|| Error::not_found("Swarm not found"))?;
        let workspace = self.access.by_id(&swarm.workspace_id).await?;
        self.access
            .require(&workspace, &request.user_id, Permission::Administer)
            .await?;

        let sealed_key = swarm
            .pool_api_key
            .as_ref()
            .ok_or_else(|| Error::invalid_request("Swarm is missing a pool API key"))?;
        let api_key = self.decrypt(SecretKind::PoolApiKey, sealed_key)?;
        let payload = self
            .build_payload(&swarm, &request.user_id, request.container_files)
            .await?;

        let outcome = self
            .retry
            .run(self.sleeper.as_ref(), "create_pool", |_attempt| {
                self.pool_manager.create_pool(api_key.as_str(), &payload)
            })
            .await;

        match outcome {
            Ok(pool) => {
                self.record_outcome(&swarm, PoolState::Complete, Some(pool.name.clone()))
                    .await?;
                info!(swarm_id = %swarm.id, pool = %pool.name, "pool created");
                Ok(pool)
            }
            Err(err) => {
                if let Err(state_err) = self.record_outcome(&swarm, PoolState::Failed, None).await {
                    warn!(swarm_id = %swarm.id, error = %state_err, "failed to record pool failure");
                }
                Err(map_pool_manager_error(err, "Failed to create pool"))
            }
        }
    }

    async fn claim_pod(&self, request: ClaimPodRequest) -> Result<ClaimPodResponse, Error> {
        let workspace = self.access.by_id(&request.workspace_id).await?;
        self.access
            .require(&workspace, &request.user_id, Permission::Read)
            .await?;

        let swarm = self
            .swarms
            .find_by_workspace(&workspace.id)
            .await
            .map_err(map_swarm_error)?
            .ok_or_else(|| Error::not_found("No swarm found for this workspace"))?;
        let (Some(pool_name), Some(sealed_key)) = (&swarm.pool_name, &swarm.pool_api_key) else {
            return Err(Error::invalid_request(
                "Swarm not properly configured with pool information",
            ));
        };
        let api_key = self.decrypt(SecretKind::PoolApiKey, sealed_key)?;

        let pod = self
            .pool_manager
            .claim_pod(api_key.as_str(), pool_name)
            .await
            .map_err(|err| map_pool_manager_error(err, "Failed to claim pod"))?;
        let frontend = pod
            .frontend_url()
            .ok_or_else(|| Error::failed("Failed to claim pod: no frontend available"))?
            .to_owned();
        info!(workspace_id = %workspace.id, pod_id = %pod.id, "pod claimed");
        Ok(ClaimPodResponse {
            workspace_id: workspace.id,
            frontend,
        })
    }
}

/// Upstream API errors pass through; anything else becomes `fallback`.
pub(crate) fn map_pool_manager_error(error: PoolManagerError, fallback: &str) -> Error {
    match error {
        PoolManagerError::Api {
            status,
            message,
            details,
        } => {
            let error = Error::upstream(status, POOL_MANAGER_SERVICE, message);
            match details {
                Some(details) => error.with_details(details),
                None => error,
            }
        }
        other => {
            warn!(error = %other, "{fallback}");
            Error::failed(fallback)
        }
    }
}

fn map_cipher_error(kind: SecretKind, error: &FieldCipherError) -> Error {
    Error::internal(format!("failed to decrypt {kind}: {error}"))
}

fn map_swarm_error(error: SwarmRepositoryError) -> Error {
    match error {
        SwarmRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("swarm repository unavailable: {message}"))
        }
        SwarmRepositoryError::Query { message } => {
            Error::internal(format!("swarm repository error: {message}"))
        }
    }
}

fn map_credentials_error(error: GithubCredentialsRepositoryError) -> Error {
    match error {
        GithubCredentialsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("credentials repository unavailable: {message}"))
        }
        GithubCredentialsRepositoryError::Query { message } => {
            Error::internal(format!("credentials repository error: {message}"))
        }
    }
}

#[cfg(test)]
#[path = "pool_service_tests.rs"]
mod tests;
