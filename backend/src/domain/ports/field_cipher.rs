//! Port for sealing and opening encrypted secret fields.
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::domain::{EncryptedField, SecretKind};

use super::define_port_error;

define_port_error! {
    /// Failures raised while sealing or opening a secret.
    pub enum FieldCipherError {
        /// The envelope names a key the keyring does not hold.
        UnknownKey { key_id: String } => "no encryption key registered for id {key_id}",
        /// The envelope could not be decoded.
        Malformed { message: String } => "encrypted field is malformed: {message}",
        /// Authentication failed: wrong key, wrong field, or tampering.
        Authentication { field: String } => "encrypted {field} failed authentication",
        /// Sealing failed.
        Encryption { message: String } => "encryption failed: {message}",
    }
}

/// Symmetric cipher bound to a keyring.
#[cfg_attr(test, mockall::automock)]
pub trait FieldCipher: Send + Sync {
    /// Seal `plaintext` for `kind` with the active key.
    fn encrypt(
        &self,
        kind: SecretKind,
        plaintext: &str,
        at: DateTime<Utc>,
    ) -> Result<EncryptedField, FieldCipherError>;

    /// Open a sealed value previously produced for `kind`.
    fn decrypt(
        &self,
        kind: SecretKind,
        field: &EncryptedField,
    ) -> Result<Zeroizing<String>, FieldCipherError>;
}
