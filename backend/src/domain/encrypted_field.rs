//! Encrypted-at-rest secret values.
//!
//! Secrets are persisted as a self-describing JSON object so a stored value
//! names the key that sealed it. Decryption is the job of the
//! [`FieldCipher`](crate::domain::ports::FieldCipher) port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format version written into every [`EncryptedField`].
pub const ENCRYPTED_FIELD_VERSION: &str = "1";

/// Ciphertext envelope stored in JSON columns.
///
/// Binary members (`data`, `iv`, `tag`) are standard base64.
///
/// # Examples
/// ```
/// use hive_backend::domain::EncryptedField;
///
/// let raw = r#"{"data":"AA==","iv":"AAAAAAAAAAAAAAAA","tag":"AAAAAAAAAAAAAAAAAAAAAA==",
///     "keyId":"k1","version":"1","encryptedAt":"2025-01-01T00:00:00Z"}"#;
/// let field: EncryptedField = serde_json::from_str(raw).unwrap();
/// assert_eq!(field.key_id, "k1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedField {
    /// Ciphertext without the authentication tag.
    pub data: String,
    /// 96-bit nonce.
    pub iv: String,
    /// 128-bit GCM authentication tag.
    pub tag: String,
    /// Identifier of the key used to seal the value.
    pub key_id: String,
    /// Envelope format version.
    pub version: String,
    /// When the value was sealed.
    pub encrypted_at: DateTime<Utc>,
}

/// Logical secret a ciphertext belongs to.
///
/// The name is bound into the ciphertext as associated data, so a value sealed
/// for one field cannot be replayed as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Swarm API key used against the Pool Manager.
    PoolApiKey,
    /// GitHub token linked to a user.
    GithubToken,
    /// Value of a swarm environment variable.
    EnvironmentVariable,
}

impl SecretKind {
    /// Associated-data label for this field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PoolApiKey => "poolApiKey",
            Self::GithubToken => "githubToken",
            Self::EnvironmentVariable => "environmentVariables",
        }
    }
}

impl std::fmt::Display for SecretKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
