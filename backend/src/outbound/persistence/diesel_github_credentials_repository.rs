//! Reads a user's linked GitHub credentials from the `users` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GithubCredentialsRepository, GithubCredentialsRepositoryError};
use crate::domain::{EncryptedField, GithubCredentials, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::GithubCredentialsRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

#[derive(Clone)]
pub struct DieselGithubCredentialsRepository {
    pool: DbPool,
}

impl DieselGithubCredentialsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> GithubCredentialsRepositoryError {
    map_pool_error(error, GithubCredentialsRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> GithubCredentialsRepositoryError {
    map_diesel_error(
        error,
        GithubCredentialsRepositoryError::query,
        GithubCredentialsRepositoryError::connection,
    )
}

/// Both a username and a token are needed for credentials to count as linked.
fn to_credentials(
    row: GithubCredentialsRow,
) -> Result<Option<GithubCredentials>, GithubCredentialsRepositoryError> {
    let (Some(username), Some(token)) = (row.github_username, row.github_token) else {
        return Ok(None);
    };
    let token = serde_json::from_value::<EncryptedField>(token).map_err(|err| {
        GithubCredentialsRepositoryError::query(format!("stored github_token is malformed: {err}"))
    })?;
    Ok(Some(GithubCredentials { username, token }))
}

#[async_trait]
impl GithubCredentialsRepository for DieselGithubCredentialsRepository {
    async fn find_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GithubCredentials>, GithubCredentialsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(user_id.as_uuid())
            .select(GithubCredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        match row {
            Some(row) => to_credentials(row),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(None, Some(json!({})))]
    #[case(Some("octocat"), None)]
    fn partial_links_are_ignored(
        #[case] username: Option<&str>,
        #[case] token: Option<serde_json::Value>,
    ) {
        let row = GithubCredentialsRow {
            github_username: username.map(str::to_owned),
            github_token: token,
        };
        assert_eq!(to_credentials(row), Ok(None));
    }

    #[rstest]
    fn malformed_token_is_a_query_error() {
        let row = GithubCredentialsRow {
            github_username: Some("octocat".into()),
            github_token: Some(json!("plaintext")),
        };
        assert!(matches!(
            to_credentials(row),
            Err(GithubCredentialsRepositoryError::Query { .. })
        ));
    }
}
