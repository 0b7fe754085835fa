//! Login credentials accepted by the development login endpoint.

use zeroize::Zeroizing;

/// Reasons a login payload is rejected before authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// The username is trimmed; the password is kept verbatim in a zeroising
/// buffer.
///
/// # Examples
/// ```
/// use hive_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw username and password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Caller-supplied password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
