//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are called by
//! inbound adapters. Driven ports (repositories and external services) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod agent_command;
mod chat_message_repository;
mod field_cipher;
mod github_credentials_repository;
mod language_model;
mod login_service;
mod object_storage;
mod pool_command;
mod pool_manager;
mod swarm_repository;
mod task_command;
mod task_repository;
mod workspace_logo_command;
mod workspace_logo_query;
mod workspace_repository;

#[cfg(test)]
pub use agent_command::MockAgentCommand;
pub use agent_command::{
    AgentChatRequest, AgentCommand, AgentReplyStream, MAX_AGENT_MESSAGE_CHARS,
    SuggestBranchRequest,
};
#[cfg(test)]
pub use chat_message_repository::MockChatMessageRepository;
pub use chat_message_repository::{ChatMessageRepository, ChatMessageRepositoryError};
#[cfg(test)]
pub use field_cipher::MockFieldCipher;
pub use field_cipher::{FieldCipher, FieldCipherError};
#[cfg(test)]
pub use github_credentials_repository::MockGithubCredentialsRepository;
pub use github_credentials_repository::{
    GithubCredentialsRepository, GithubCredentialsRepositoryError,
};
#[cfg(test)]
pub use language_model::MockLanguageModel;
pub use language_model::{
    CompletionRequest, LanguageModel, LanguageModelError, PromptMessage, TextDeltaStream,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_USER_ID, FixtureLoginService, LoginService};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{ObjectStorage, ObjectStorageError, PresignMethod, PresignRequest};
#[cfg(test)]
pub use pool_command::MockPoolCommand;
pub use pool_command::{
    ClaimPodRequest, ClaimPodResponse, CreatePoolRequest, PoolCommand, SwarmSelector,
};
#[cfg(test)]
pub use pool_manager::MockPoolManager;
pub use pool_manager::{
    CreatePoolPayload, POOL_MANAGER_SERVICE, PoolEnvVar, PoolManager, PoolManagerError,
    PoolSummary,
};
#[cfg(test)]
pub use swarm_repository::MockSwarmRepository;
pub use swarm_repository::{SwarmRepository, SwarmRepositoryError};
#[cfg(test)]
pub use task_command::MockTaskCommand;
pub use task_command::{DeleteTaskRequest, TaskCommand};
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskRepository, TaskRepositoryError};
#[cfg(test)]
pub use workspace_logo_command::MockWorkspaceLogoCommand;
pub use workspace_logo_command::{
    ConfirmLogoRequest, DeleteLogoRequest, LogoUploadRequest, LogoUploadTicket,
    WorkspaceLogoCommand,
};
#[cfg(test)]
pub use workspace_logo_query::MockWorkspaceLogoQuery;
pub use workspace_logo_query::{LogoUrl, LogoUrlRequest, WorkspaceLogoQuery};
#[cfg(test)]
pub use workspace_repository::MockWorkspaceRepository;
pub use workspace_repository::{WorkspaceRepository, WorkspaceRepositoryError};
