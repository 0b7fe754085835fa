//! User identity and linked GitHub credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EncryptedField;

/// Rejection raised when a user identifier is not a canonical UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier was not a valid UUID.
    #[error("user id must be a valid UUID")]
    Invalid,
}

/// Stable user identifier stored as a UUID.
///
/// Keeps the caller's textual form so session cookies round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserIdError::Empty);
        }
        if raw.trim() != raw {
            return Err(UserIdError::Invalid);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserIdError::Invalid)?;
        Ok(Self(parsed, raw.to_owned()))
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id, id.to_string())
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.1
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.1)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// GitHub identity linked to a user, with the token still encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubCredentials {
    /// GitHub login name.
    pub username: String,
    /// Personal access or OAuth token, encrypted at rest.
    pub token: EncryptedField,
}
