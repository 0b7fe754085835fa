//! Domain entities, errors, ports, and the services behind the HTTP API.
//!
//! Nothing in this module knows about Actix, Diesel, or any external
//! provider; adapters in `inbound` and `outbound` plug into [`ports`].

pub mod ports;

mod agent_service;
mod auth;
mod branch_name;
mod encrypted_field;
mod error;
mod logo;
mod pod;
mod pool_service;
mod retry;
mod swarm;
mod task;
mod task_service;
mod trace_id;
mod user;
mod workspace;
mod workspace_access;
mod workspace_logo_service;

pub use self::agent_service::{AgentService, AgentServicePorts};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::branch_name::{
    BranchSuggestion, BranchSuggestionError, MAX_BRANCH_NAME_LEN, sanitize_branch_name,
};
pub use self::encrypted_field::{ENCRYPTED_FIELD_VERSION, EncryptedField, SecretKind};
pub use self::error::{EmptyErrorMessage, Error, ErrorCode, TRACE_ID_HEADER};
pub use self::logo::{
    LOGO_DOWNLOAD_URL_TTL, LOGO_UPLOAD_URL_TTL, LogoContentType, LogoUpload, MAX_LOGO_BYTES,
    UnsupportedContentType, validate_logo_key,
};
pub use self::pod::{ClaimedPod, DEFAULT_FRONTEND_PORT, INTERNAL_POD_PORTS, select_frontend};
pub use self::pool_service::{DEFAULT_MINIMUM_VMS, PoolService, PoolServicePorts};
pub use self::retry::{FixedRetryPolicy, Sleeper, TokioSleeper};
pub use self::swarm::{PoolState, Swarm, SwarmEnvVar, UnknownPoolState};
pub use self::task::{ChatMessage, ChatRole, Task, UnknownChatRole};
pub use self::task_service::TaskService;
pub use self::trace_id::TraceId;
pub use self::user::{GithubCredentials, UserId, UserIdError};
pub use self::workspace::{
    Permission, UnknownWorkspaceRole, WORKSPACE_LOGO_PREFIX, Workspace, WorkspaceRole, authorize,
};
pub use self::workspace_access::WorkspaceAccess;
pub use self::workspace_logo_service::WorkspaceLogoService;

/// Result alias used by handlers.
pub type ApiResult<T> = Result<T, Error>;
