//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AgentCommand, LoginService, PoolCommand, TaskCommand, WorkspaceLogoCommand,
    WorkspaceLogoQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub tasks: Arc<dyn TaskCommand>,
    pub logos: Arc<dyn WorkspaceLogoCommand>,
    pub logo_urls: Arc<dyn WorkspaceLogoQuery>,
    pub pools: Arc<dyn PoolCommand>,
    pub agent: Arc<dyn AgentCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub tasks: Arc<dyn TaskCommand>,
    pub logos: Arc<dyn WorkspaceLogoCommand>,
    pub logo_urls: Arc<dyn WorkspaceLogoQuery>,
    pub pools: Arc<dyn PoolCommand>,
    pub agent: Arc<dyn AgentCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// # fn ports() -> hive_backend::inbound::http::state::HttpStatePorts { unimplemented!() }
    /// use hive_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(ports());
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            tasks,
            logos,
            logo_urls,
            pools,
            agent,
        } = ports;
        Self {
            login,
            tasks,
            logos,
            logo_urls,
            pools,
            agent,
        }
    }
}
