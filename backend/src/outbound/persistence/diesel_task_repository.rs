//! PostgreSQL-backed `TaskRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::{Task, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{TaskDeletion, TaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::tasks;

#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TaskRepositoryError {
    map_pool_error(error, TaskRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TaskRepositoryError {
    map_diesel_error(error, TaskRepositoryError::query, TaskRepositoryError::connection)
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn find_active(&self, task_id: &Uuid) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = tasks::table
            .find(task_id)
            .filter(tasks::deleted.eq(false))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(Task::from))
    }

    async fn soft_delete(
        &self,
        task_id: &Uuid,
        deleted_by: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = TaskDeletion {
            deleted: true,
            deleted_at: Some(at),
            updated_by_id: *deleted_by.as_uuid(),
            updated_at: at,
        };
        let updated = diesel::update(tasks::table.find(task_id))
            .filter(tasks::deleted.eq(false))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(TaskRepositoryError::query(format!(
                "task {task_id} was already deleted"
            )));
        }
        Ok(())
    }
}
