//! Port for the GitHub credentials linked to a user.
use async_trait::async_trait;

use crate::domain::{GithubCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by credential lookups.
    pub enum GithubCredentialsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "credentials repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "credentials repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubCredentialsRepository: Send + Sync {
    /// Username and sealed token, when the user has linked GitHub.
    async fn find_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GithubCredentials>, GithubCredentialsRepositoryError>;
}
