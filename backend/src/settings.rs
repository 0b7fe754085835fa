//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `HIVE_*` environment variables, or a config
//! file. Raw values are validated lazily by the accessor methods so startup
//! can report every problem with the variable name that caused it.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::outbound::crypto::{AesGcmFieldCipher, KeyringError};
use crate::outbound::language_model::AnthropicConfig;
use crate::outbound::object_storage::S3Config;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_KEY_ID: &str = "primary";
const DEFAULT_S3_REGION: &str = "us-east-1";
const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Problems found while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting HIVE_{name}")]
    Missing { name: &'static str },
    #[error("invalid value for HIVE_{name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error(transparent)]
    Keyring(#[from] KeyringError),
}

impl From<SettingsError> for std::io::Error {
    fn from(value: SettingsError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, value.to_string())
    }
}

/// Raw settings as loaded by OrthoConfig.
#[derive(Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HIVE")]
#[serde(default)]
pub struct HiveSettings {
    /// Socket address the HTTP server listens on.
    pub bind_address: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Pool Manager API root.
    pub pool_manager_url: Option<String>,
    /// Active field-encryption key, 64 hex characters.
    pub encryption_key: Option<String>,
    /// Identifier stored alongside values encrypted with the active key.
    pub encryption_key_id: Option<String>,
    /// Older keys still accepted for decryption, as `id:hex` pairs separated by commas.
    pub encryption_retired_keys: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible stores.
    pub s3_endpoint: Option<String>,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_session_token: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub anthropic_model: Option<String>,
    /// Timeout for outbound HTTP calls, in seconds; zero selects the default.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for HiveSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiveSettings")
            .field("bind_address", &self.bind_address)
            .field("pool_manager_url", &self.pool_manager_url)
            .field("encryption_key_id", &self.encryption_key_id)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("anthropic_model", &self.anthropic_model)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish_non_exhaustive()
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { name })
}

fn parse_url(raw: &str, name: &'static str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Invalid {
        name,
        reason: err.to_string(),
    })
}

impl HiveSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self
            .bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        raw.parse().map_err(|_| SettingsError::Invalid {
            name: "BIND_ADDRESS",
            reason: format!("'{raw}' is not a socket address"),
        })
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(&self.database_url, "DATABASE_URL")
    }

    pub fn pool_manager_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            required(&self.pool_manager_url, "POOL_MANAGER_URL")?,
            "POOL_MANAGER_URL",
        )
    }

    pub fn http_timeout(&self) -> Duration {
        match self.http_timeout_secs {
            0 => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Keyring with the active key and any retired keys.
    pub fn field_cipher(&self) -> Result<AesGcmFieldCipher, SettingsError> {
        let key = Zeroizing::new(required(&self.encryption_key, "ENCRYPTION_KEY")?.to_owned());
        let key_id = self
            .encryption_key_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_KEY_ID);
        let mut cipher = AesGcmFieldCipher::new(key_id, &key)?;
        for entry in self
            .encryption_retired_keys
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
        {
            let (id, hex_key) = entry.split_once(':').ok_or_else(|| SettingsError::Invalid {
                name: "ENCRYPTION_RETIRED_KEYS",
                reason: "expected comma-separated id:hex pairs".to_owned(),
            })?;
            cipher = cipher.with_retired_key(id.trim(), hex_key.trim())?;
        }
        Ok(cipher)
    }

    pub fn s3_config(&self) -> Result<S3Config, SettingsError> {
        let endpoint = self
            .s3_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_url(raw, "S3_ENDPOINT"))
            .transpose()?;
        Ok(S3Config {
            bucket: required(&self.s3_bucket, "S3_BUCKET")?.to_owned(),
            region: self
                .s3_region
                .clone()
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_owned()),
            endpoint,
            access_key_id: required(&self.s3_access_key_id, "S3_ACCESS_KEY_ID")?.to_owned(),
            secret_access_key: Zeroizing::new(
                required(&self.s3_secret_access_key, "S3_SECRET_ACCESS_KEY")?.to_owned(),
            ),
            session_token: self.s3_session_token.clone().map(Zeroizing::new),
        })
    }

    pub fn anthropic_config(&self) -> Result<AnthropicConfig, SettingsError> {
        let base_url = self
            .anthropic_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_URL);
        Ok(AnthropicConfig {
            api_key: Zeroizing::new(
                required(&self.anthropic_api_key, "ANTHROPIC_API_KEY")?.to_owned(),
            ),
            base_url: parse_url(base_url, "ANTHROPIC_BASE_URL")?,
            model: self
                .anthropic_model
                .clone()
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_owned()),
            timeout: self.http_timeout(),
        })
    }
}
