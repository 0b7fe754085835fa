//! Driving port that turns login credentials into a session user.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Fixed user id issued by [`FixtureLoginService`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Authenticate credentials on behalf of inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the user the credentials belong to.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Development authenticator accepting `admin` / `password`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() != "admin" || credentials.password() != "password" {
            return Err(Error::unauthorized("invalid credentials"));
        }
        UserId::new(FIXTURE_USER_ID)
            .map_err(|err| Error::internal(format!("fixture user id rejected: {err}")))
    }
}
