//! Embedded schema migrations applied at start-up.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while bringing the schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task aborted: {0}")]
    Aborted(String),
}

fn apply_blocking(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection = PgConnection::establish(database_url)
        .map_err(|err| MigrationError::Connection(err.to_string()))?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|err| MigrationError::Apply(err.to_string()))
}

/// Run every pending migration against `database_url`.
///
/// Diesel's harness is synchronous, so the work runs on Tokio's blocking pool.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply_blocking(&url))
        .await
        .map_err(|err| MigrationError::Aborted(err.to_string()))??;
    info!(applied, "database migrations complete");
    Ok(())
}
