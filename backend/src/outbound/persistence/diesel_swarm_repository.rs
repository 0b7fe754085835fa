//! PostgreSQL-backed `SwarmRepository`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{SwarmRepository, SwarmRepositoryError};
use crate::domain::{PoolState, Swarm};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{PoolStateUpdate, SwarmRow};
use super::pool::{DbPool, PoolError};
use super::schema::swarms;

#[derive(Clone)]
pub struct DieselSwarmRepository {
    pool: DbPool,
}

impl DieselSwarmRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SwarmRepositoryError {
    map_pool_error(error, SwarmRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SwarmRepositoryError {
    map_diesel_error(error, SwarmRepositoryError::query, SwarmRepositoryError::connection)
}

fn to_domain(row: Option<SwarmRow>) -> Result<Option<Swarm>, SwarmRepositoryError> {
    row.map(|row| Swarm::try_from(row).map_err(SwarmRepositoryError::query))
        .transpose()
}

#[async_trait]
impl SwarmRepository for DieselSwarmRepository {
    async fn find_by_swarm_id(
        &self,
        swarm_id: &str,
    ) -> Result<Option<Swarm>, SwarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = swarms::table
            .filter(swarms::swarm_id.eq(swarm_id))
            .select(SwarmRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        to_domain(row)
    }

    async fn find_by_workspace(
        &self,
        workspace_id: &Uuid,
    ) -> Result<Option<Swarm>, SwarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = swarms::table
            .filter(swarms::workspace_id.eq(workspace_id))
            .select(SwarmRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        to_domain(row)
    }

    async fn update_pool_state(
        &self,
        id: &Uuid,
        state: PoolState,
        pool_name: Option<String>,
    ) -> Result<(), SwarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = PoolStateUpdate {
            pool_state: state.as_str(),
            pool_name: pool_name.as_deref(),
            updated_at: Utc::now(),
        };
        diesel::update(swarms::table.find(id))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
