//! Builders wiring database, storage, and upstream adapters into HTTP state.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use hive_backend::domain::ports::FixtureLoginService;
use hive_backend::domain::{
    AgentService, AgentServicePorts, PoolService, PoolServicePorts, TaskService, TokioSleeper,
    WorkspaceAccess, WorkspaceLogoService,
};
use hive_backend::inbound::http::state::{HttpState, HttpStatePorts};
use hive_backend::outbound::language_model::AnthropicLanguageModel;
use hive_backend::outbound::object_storage::S3ObjectStorage;
use hive_backend::outbound::persistence::{
    DbPool, DieselChatMessageRepository, DieselGithubCredentialsRepository,
    DieselSwarmRepository, DieselTaskRepository, DieselWorkspaceRepository,
};
use hive_backend::outbound::pool_manager::PoolManagerHttpClient;
use hive_backend::settings::HiveSettings;

fn adapter_error(adapter: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("failed to build {adapter} adapter: {error}"))
}

/// Build handler state backed by PostgreSQL and the configured upstreams.
///
/// # Errors
/// Returns [`io::Error`] when a required setting is missing or an adapter
/// cannot be constructed.
pub fn build_http_state(settings: &HiveSettings, pool: &DbPool) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let timeout = settings.http_timeout();

    let cipher = settings.field_cipher()?;
    info!(
        key_id = cipher.active_key_id(),
        fingerprint = cipher.active_fingerprint().unwrap_or("unknown"),
        "field encryption keyring loaded"
    );

    let storage = S3ObjectStorage::new(settings.s3_config()?, timeout, clock.clone())
        .map_err(|error| adapter_error("object storage", error))?;
    let model = AnthropicLanguageModel::new(settings.anthropic_config()?)
        .map_err(|error| adapter_error("language model", error))?;
    let pool_manager = PoolManagerHttpClient::new(settings.pool_manager_url()?, timeout)
        .map_err(|error| adapter_error("pool manager", error))?;

    let workspaces = Arc::new(DieselWorkspaceRepository::new(pool.clone()));
    let tasks = Arc::new(DieselTaskRepository::new(pool.clone()));
    let access = WorkspaceAccess::new(workspaces.clone());
    let logos = Arc::new(WorkspaceLogoService::new(
        access.clone(),
        Arc::new(storage),
        clock.clone(),
    ));

    Ok(HttpState::new(HttpStatePorts {
        login: Arc::new(FixtureLoginService),
        tasks: Arc::new(TaskService::new(access, tasks.clone(), clock.clone())),
        logos: logos.clone(),
        logo_urls: logos,
        pools: Arc::new(PoolService::new(PoolServicePorts {
            workspaces: workspaces.clone(),
            swarms: Arc::new(DieselSwarmRepository::new(pool.clone())),
            github_credentials: Arc::new(DieselGithubCredentialsRepository::new(pool.clone())),
            pool_manager: Arc::new(pool_manager),
            cipher: Arc::new(cipher),
            sleeper: Arc::new(TokioSleeper),
        })),
        agent: Arc::new(AgentService::new(AgentServicePorts {
            workspaces,
            tasks,
            messages: Arc::new(DieselChatMessageRepository::new(pool.clone())),
            model: Arc::new(model),
            clock,
        })),
    }))
}
