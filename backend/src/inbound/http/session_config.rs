//! Session cookie settings read from `SESSION_*` environment variables.
//!
//! Release builds require every toggle to be present and valid. Debug builds
//! fall back to safe defaults and log a warning for each fallback.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub(crate) const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/hive/session_key";
/// Shortest key file accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Whether configuration problems are fatal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Fall back to defaults with a warning.
    Debug,
    /// Reject missing or invalid toggles.
    Release,
}

impl BuildMode {
    /// Mode matching the current compilation profile.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Return `fallback` in debug builds, `error` otherwise.
    fn tolerate<T>(
        self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        match self {
            Self::Debug => {
                warn!(error = %error, "session configuration fallback");
                Ok(fallback)
            }
            Self::Release => Err(error),
        }
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for the private cookie.
    pub key: Key,
    /// Mark the cookie `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("key", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// Problems found while reading session settings.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {SESSION_KEY_MIN_LEN} bytes, got {length}")]
    KeyTooShort { path: PathBuf, length: usize },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

impl SessionSettings {
    /// Read and validate the session toggles.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::inbound::http::session_config::{BuildMode, SessionSettings};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|_| None);
    ///
    /// let settings = SessionSettings::from_env(&env, BuildMode::Debug).unwrap();
    /// assert!(settings.cookie_secure);
    /// assert!(SessionSettings::from_env(&env, BuildMode::Release).is_err());
    /// ```
    pub fn from_env(env: &impl Env, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = read_bool(env, mode, COOKIE_SECURE_ENV, true)?;
        let same_site = read_same_site(env, mode, cookie_secure)?;
        let allow_ephemeral = read_bool(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
        if allow_ephemeral && mode == BuildMode::Release {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        let key = read_key(env, mode, allow_ephemeral)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }
}

fn read_bool(
    env: &impl Env,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return mode.tolerate(default, SessionConfigError::MissingEnv { name });
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => mode.tolerate(
            default,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn read_same_site(
    env: &impl Env,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return mode.tolerate(default, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => mode.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => mode.tolerate(
            default,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn read_key(
    env: &impl Env,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    match std::fs::read(&path).map(Zeroizing::new) {
        Ok(bytes) if bytes.len() < SESSION_KEY_MIN_LEN => mode.tolerate(
            Key::generate(),
            SessionConfigError::KeyTooShort {
                length: bytes.len(),
                path,
            },
        ),
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}
