//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use hive_backend::inbound::http::session_config::SessionSettings;
use hive_backend::inbound::http::state::HttpState;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Construct a server configuration around fully wired handler state.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        http_state: HttpState,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            http_state,
        }
    }

    /// Construct a configuration from validated session cookie settings.
    #[must_use]
    pub fn from_session(
        session: SessionSettings,
        bind_addr: SocketAddr,
        http_state: HttpState,
    ) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self::new(key, cookie_secure, same_site, bind_addr, http_state)
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
