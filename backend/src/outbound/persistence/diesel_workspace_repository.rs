//! PostgreSQL-backed `WorkspaceRepository`.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{WorkspaceRepository, WorkspaceRepositoryError};
use crate::domain::{UserId, Workspace, WorkspaceRole};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::WorkspaceRow;
use super::pool::{DbPool, PoolError};
use super::schema::{workspace_members, workspaces};

#[derive(Clone)]
pub struct DieselWorkspaceRepository {
    pool: DbPool,
}

impl DieselWorkspaceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> WorkspaceRepositoryError {
    map_pool_error(error, WorkspaceRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> WorkspaceRepositoryError {
    map_diesel_error(
        error,
        WorkspaceRepositoryError::query,
        WorkspaceRepositoryError::connection,
    )
}

/// Role of a member who has not left the workspace.
fn active_member_role(
    workspace_id: Uuid,
    user_id: Uuid,
) -> workspace_members::BoxedQuery<'static, Pg, Text> {
    workspace_members::table
        .filter(workspace_members::workspace_id.eq(workspace_id))
        .filter(workspace_members::user_id.eq(user_id))
        .filter(workspace_members::left_at.is_null())
        .select(workspace_members::role)
        .into_boxed()
}

#[async_trait]
impl WorkspaceRepository for DieselWorkspaceRepository {
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = workspaces::table
            .filter(workspaces::slug.eq(slug))
            .filter(workspaces::deleted.eq(false))
            .select(WorkspaceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(Workspace::from))
    }

    async fn find_active_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Workspace>, WorkspaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = workspaces::table
            .find(id)
            .filter(workspaces::deleted.eq(false))
            .select(WorkspaceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(Workspace::from))
    }

    async fn find_member_role(
        &self,
        workspace_id: &Uuid,
        user_id: &UserId,
    ) -> Result<Option<WorkspaceRole>, WorkspaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let role: Option<String> = active_member_role(*workspace_id, *user_id.as_uuid())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        role.map(|role| {
            role.parse::<WorkspaceRole>().map_err(|err| {
                warn!(%workspace_id, %user_id, error = %err, "stored member role is invalid");
                WorkspaceRepositoryError::query(err.to_string())
            })
        })
        .transpose()
    }

    async fn set_logo_key(
        &self,
        workspace_id: &Uuid,
        logo_key: Option<String>,
    ) -> Result<(), WorkspaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(workspaces::table.find(workspace_id))
            .set((
                workspaces::logo_key.eq(logo_key),
                workspaces::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn member_lookup_skips_departed_members() {
        let query = active_member_role(Uuid::nil(), Uuid::nil());
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains(r#""workspace_members"."left_at" IS NULL"#), "{sql}");
        assert!(sql.contains(r#""workspace_members"."user_id" = $2"#), "{sql}");
    }
}
