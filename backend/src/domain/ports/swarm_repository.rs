//! Port abstraction for swarm (pool configuration) persistence.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{PoolState, Swarm};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by swarm repository adapters.
    pub enum SwarmRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "swarm repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "swarm repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwarmRepository: Send + Sync {
    /// Fetch a swarm by its external swarm identifier.
    async fn find_by_swarm_id(&self, swarm_id: &str)
    -> Result<Option<Swarm>, SwarmRepositoryError>;

    /// Fetch the single swarm belonging to a workspace.
    async fn find_by_workspace(
        &self,
        workspace_id: &Uuid,
    ) -> Result<Option<Swarm>, SwarmRepositoryError>;

    /// Record a provisioning outcome. `pool_name`, when given, replaces the
    /// stored pool name.
    async fn update_pool_state(
        &self,
        id: &Uuid,
        state: PoolState,
        pool_name: Option<String>,
    ) -> Result<(), SwarmRepositoryError>;
}
