//! Backend entry-point: loads settings, wires adapters, and serves the API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use hive_backend::inbound::http::health::HealthState;
use hive_backend::inbound::http::session_config::{BuildMode, SessionSettings};
use hive_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use hive_backend::settings::HiveSettings;
use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = HiveSettings::load()
        .map_err(|error| io::Error::other(format!("failed to load settings: {error}")))?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(io::Error::other)?;

    let database_url = settings.database_url()?;
    run_pending_migrations(database_url)
        .await
        .map_err(io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(io::Error::other)?;

    let http_state = build_http_state(&settings, &pool)?;
    let config = ServerConfig::from_session(session, settings.bind_addr()?, http_state);

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}

#[cfg(test)]
mod tests;
