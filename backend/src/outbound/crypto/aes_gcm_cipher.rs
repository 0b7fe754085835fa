//! AES-256-GCM implementation of the `FieldCipher` port.
//!
//! Each sealed value records the id of the key that sealed it. The cipher
//! holds one active key for new values and any number of retired keys that
//! can still open older ones. The secret kind is bound as associated data.

use std::collections::HashMap;
use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::ports::{FieldCipher, FieldCipherError};
use crate::domain::{ENCRYPTED_FIELD_VERSION, EncryptedField, SecretKind};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Rejection for keys supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyringError {
    /// The key id was blank.
    #[error("encryption key id must not be empty")]
    EmptyKeyId,
    /// The key was not valid hexadecimal.
    #[error("encryption key {key_id} is not valid hex")]
    InvalidHex { key_id: String },
    /// The key decoded to the wrong number of bytes.
    #[error("encryption key {key_id} must be {KEY_LEN} bytes, got {len}")]
    WrongLength { key_id: String, len: usize },
}

struct KeyEntry {
    cipher: Aes256Gcm,
    fingerprint: String,
}

/// Keyring-backed AES-256-GCM field cipher.
pub struct AesGcmFieldCipher {
    active_key_id: String,
    keys: HashMap<String, KeyEntry>,
}

impl fmt::Debug for AesGcmFieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmFieldCipher")
            .field("active_key_id", &self.active_key_id)
            .field("key_ids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn decode_key(key_id: &str, hex_key: &str) -> Result<KeyEntry, KeyringError> {
    if key_id.trim().is_empty() {
        return Err(KeyringError::EmptyKeyId);
    }
    let bytes = Zeroizing::new(hex::decode(hex_key.trim()).map_err(|_| {
        KeyringError::InvalidHex {
            key_id: key_id.to_owned(),
        }
    })?);
    if bytes.len() != KEY_LEN {
        return Err(KeyringError::WrongLength {
            key_id: key_id.to_owned(),
            len: bytes.len(),
        });
    }
    let digest = Sha256::digest(bytes.as_slice());
    Ok(KeyEntry {
        cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(bytes.as_slice())),
        fingerprint: hex::encode(&digest[..8]),
    })
}

impl AesGcmFieldCipher {
    /// Build a cipher whose active key is `hex_key` (64 hex characters).
    ///
    /// # Examples
    /// ```
    /// use hive_backend::outbound::crypto::AesGcmFieldCipher;
    ///
    /// let cipher = AesGcmFieldCipher::new("k1", &"ab".repeat(32)).unwrap();
    /// assert_eq!(cipher.active_key_id(), "k1");
    /// ```
    pub fn new(active_key_id: &str, hex_key: &str) -> Result<Self, KeyringError> {
        let entry = decode_key(active_key_id, hex_key)?;
        Ok(Self {
            active_key_id: active_key_id.to_owned(),
            keys: HashMap::from([(active_key_id.to_owned(), entry)]),
        })
    }

    /// Register a retired key that can still decrypt older values.
    pub fn with_retired_key(mut self, key_id: &str, hex_key: &str) -> Result<Self, KeyringError> {
        let entry = decode_key(key_id, hex_key)?;
        self.keys.entry(key_id.to_owned()).or_insert(entry);
        Ok(self)
    }

    /// Id stamped on newly sealed values.
    pub fn active_key_id(&self) -> &str {
        &self.active_key_id
    }

    /// Short SHA-256 fingerprint of the active key, safe to log.
    pub fn active_fingerprint(&self) -> Option<&str> {
        self.keys
            .get(&self.active_key_id)
            .map(|entry| entry.fingerprint.as_str())
    }

    fn entry(&self, key_id: &str) -> Result<&KeyEntry, FieldCipherError> {
        self.keys
            .get(key_id)
            .ok_or_else(|| FieldCipherError::unknown_key(key_id))
    }
}

fn decode_part(
    name: &str,
    value: &str,
    expected_len: Option<usize>,
) -> Result<Vec<u8>, FieldCipherError> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|err| FieldCipherError::malformed(format!("{name}: {err}")))?;
    match expected_len {
        Some(len) if bytes.len() != len => Err(FieldCipherError::malformed(format!(
            "{name} must be {len} bytes, got {}",
            bytes.len()
        ))),
        _ => Ok(bytes),
    }
}

impl FieldCipher for AesGcmFieldCipher {
    fn encrypt(
        &self,
        kind: SecretKind,
        plaintext: &str,
        at: DateTime<Utc>,
    ) -> Result<EncryptedField, FieldCipherError> {
        let entry = self.entry(&self.active_key_id)?;
        let mut iv = [0_u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let sealed = entry
            .cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: kind.as_str().as_bytes(),
                },
            )
            .map_err(|err| FieldCipherError::encryption(err.to_string()))?;
        let (data, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(EncryptedField {
            data: STANDARD.encode(data),
            iv: STANDARD.encode(iv),
            tag: STANDARD.encode(tag),
            key_id: self.active_key_id.clone(),
            version: ENCRYPTED_FIELD_VERSION.to_owned(),
            encrypted_at: at,
        })
    }

    fn decrypt(
        &self,
        kind: SecretKind,
        field: &EncryptedField,
    ) -> Result<Zeroizing<String>, FieldCipherError> {
        if field.version != ENCRYPTED_FIELD_VERSION {
            return Err(FieldCipherError::malformed(format!(
                "unsupported version {}",
                field.version
            )));
        }
        let entry = self.entry(&field.key_id)?;
        let iv = decode_part("iv", &field.iv, Some(NONCE_LEN))?;
        let tag = decode_part("tag", &field.tag, Some(TAG_LEN))?;
        let mut sealed = decode_part("data", &field.data, None)?;
        sealed.extend_from_slice(&tag);

        let opened = Zeroizing::new(
            entry
                .cipher
                .decrypt(
                    Nonce::from_slice(&iv),
                    Payload {
                        msg: &sealed,
                        aad: kind.as_str().as_bytes(),
                    },
                )
                .map_err(|_| FieldCipherError::authentication(kind.as_str()))?,
        );
        let text = std::str::from_utf8(&opened)
            .map_err(|err| FieldCipherError::malformed(format!("plaintext: {err}")))?;
        Ok(Zeroizing::new(text.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    const KEY_A: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const KEY_B: &str = "1f1e1d1c1b1a191817161514131211100f0e0d0c0b0a09080706050403020100";

    #[fixture]
    fn sealed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    #[fixture]
    fn cipher() -> AesGcmFieldCipher {
        AesGcmFieldCipher::new("k1", KEY_A).expect("valid key")
    }

    #[rstest]
    fn sealed_values_open_for_the_same_kind(
        cipher: AesGcmFieldCipher,
        sealed_at: DateTime<Utc>,
    ) {
        let field = cipher
            .encrypt(SecretKind::PoolApiKey, "pk_live_123", sealed_at)
            .expect("encrypt");
        assert_eq!(field.key_id, "k1");
        assert_eq!(field.version, "1");
        assert_eq!(field.encrypted_at, sealed_at);
        assert_ne!(field.data, "pk_live_123");

        let opened = cipher
            .decrypt(SecretKind::PoolApiKey, &field)
            .expect("decrypt");
        assert_eq!(opened.as_str(), "pk_live_123");
    }

    #[rstest]
    fn nonces_are_not_reused(cipher: AesGcmFieldCipher, sealed_at: DateTime<Utc>) {
        let first = cipher
            .encrypt(SecretKind::GithubToken, "same", sealed_at)
            .expect("encrypt");
        let second = cipher
            .encrypt(SecretKind::GithubToken, "same", sealed_at)
            .expect("encrypt");
        assert_ne!(first.iv, second.iv);
    }

    #[rstest]
    fn values_are_bound_to_their_kind(cipher: AesGcmFieldCipher, sealed_at: DateTime<Utc>) {
        let field = cipher
            .encrypt(SecretKind::PoolApiKey, "secret", sealed_at)
            .expect("encrypt");
        assert_eq!(
            cipher.decrypt(SecretKind::GithubToken, &field),
            Err(FieldCipherError::authentication("githubToken"))
        );
    }

    #[rstest]
    fn tampered_ciphertext_fails_authentication(
        cipher: AesGcmFieldCipher,
        sealed_at: DateTime<Utc>,
    ) {
        let mut field = cipher
            .encrypt(SecretKind::EnvironmentVariable, "value", sealed_at)
            .expect("encrypt");
        field.tag = STANDARD.encode([0_u8; TAG_LEN]);
        assert!(matches!(
            cipher.decrypt(SecretKind::EnvironmentVariable, &field),
            Err(FieldCipherError::Authentication { .. })
        ));
    }

    #[rstest]
    fn retired_keys_still_decrypt(sealed_at: DateTime<Utc>) {
        let old = AesGcmFieldCipher::new("k0", KEY_B).expect("old key");
        let field = old
            .encrypt(SecretKind::PoolApiKey, "rotated", sealed_at)
            .expect("encrypt");

        let current = AesGcmFieldCipher::new("k1", KEY_A)
            .and_then(|cipher| cipher.with_retired_key("k0", KEY_B))
            .expect("keyring");
        let opened = current
            .decrypt(SecretKind::PoolApiKey, &field)
            .expect("decrypt with retired key");
        assert_eq!(opened.as_str(), "rotated");
    }

    #[rstest]
    fn unknown_key_ids_are_reported(cipher: AesGcmFieldCipher, sealed_at: DateTime<Utc>) {
        let mut field = cipher
            .encrypt(SecretKind::PoolApiKey, "secret", sealed_at)
            .expect("encrypt");
        field.key_id = "k9".into();
        assert_eq!(
            cipher.decrypt(SecretKind::PoolApiKey, &field),
            Err(FieldCipherError::unknown_key("k9"))
        );
    }

    #[rstest]
    #[case::not_hex("zz".repeat(32), KeyringError::InvalidHex { key_id: "k1".into() })]
    #[case::short("ab".repeat(16), KeyringError::WrongLength { key_id: "k1".into(), len: 16 })]
    fn rejects_bad_keys(#[case] hex_key: String, #[case] expected: KeyringError) {
        assert_eq!(
            AesGcmFieldCipher::new("k1", &hex_key).map(|_| ()),
            Err(expected)
        );
    }

    #[rstest]
    fn fingerprint_does_not_reveal_key(cipher: AesGcmFieldCipher) {
        let fingerprint = cipher.active_fingerprint().expect("fingerprint");
        assert_eq!(fingerprint.len(), 16);
        assert!(!KEY_A.contains(fingerprint));
    }
}
