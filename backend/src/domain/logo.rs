//! Workspace logo upload rules and object key layout.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::{Error, Workspace};

/// Largest accepted logo, in bytes.
pub const MAX_LOGO_BYTES: u64 = 1_048_576;

/// Validity of presigned upload URLs.
pub const LOGO_UPLOAD_URL_TTL: Duration = Duration::from_secs(900);

/// Validity of presigned download URLs.
pub const LOGO_DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// Image formats accepted as workspace logos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoContentType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl LogoContentType {
    /// Every accepted type.
    pub const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    /// MIME type.
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used in object keys.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Rejection for MIME types outside [`LogoContentType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported logo content type: {0}")]
pub struct UnsupportedContentType(pub String);

impl FromStr for LogoContentType {
    type Err = UnsupportedContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime() == normalised)
            .ok_or_else(|| UnsupportedContentType(s.to_owned()))
    }
}

/// Validated description of a logo the client intends to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    content_type: LogoContentType,
    size: u64,
}

impl LogoUpload {
    /// Check filename, MIME type and size.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::{LogoContentType, LogoUpload};
    ///
    /// let upload = LogoUpload::new("logo.png", "image/png", 2048).unwrap();
    /// assert_eq!(upload.content_type(), LogoContentType::Png);
    /// assert!(LogoUpload::new("logo.svg", "image/svg+xml", 2048).is_err());
    /// ```
    pub fn new(filename: &str, content_type: &str, size: u64) -> Result<Self, Error> {
        if filename.trim().is_empty() {
            return Err(invalid_field(
                "filename",
                "Missing required field: filename",
                "missing_field",
            ));
        }
        let content_type = content_type.parse::<LogoContentType>().map_err(|_| {
            let allowed: Vec<&str> = LogoContentType::ALL.iter().map(|t| t.mime()).collect();
            invalid_field(
                "contentType",
                format!("Invalid file type. Allowed types: {}", allowed.join(", ")),
                "unsupported_content_type",
            )
        })?;
        if size == 0 || size > MAX_LOGO_BYTES {
            return Err(invalid_field(
                "size",
                "File size must be between 1 byte and 1MB",
                "invalid_size",
            ));
        }
        Ok(Self { content_type, size })
    }

    /// Accepted content type.
    pub fn content_type(&self) -> LogoContentType {
        self.content_type
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Object key: `workspace-logos/{workspaceId}/{unixMillis}_{uuid}.{ext}`.
    pub fn object_key(&self, workspace: &Workspace, at: DateTime<Utc>, nonce: Uuid) -> String {
        format!(
            "{}{}_{}.{}",
            workspace.logo_prefix(),
            at.timestamp_millis(),
            nonce,
            self.content_type.extension()
        )
    }
}

/// Ensure a confirmed key lives under the workspace's logo prefix.
pub fn validate_logo_key(workspace: &Workspace, key: &str) -> Result<(), Error> {
    let key = key.trim();
    let prefix = workspace.logo_prefix();
    if key.len() <= prefix.len() || !key.starts_with(&prefix) || key.contains("..") {
        return Err(invalid_field("s3Path", "Invalid S3 path", "invalid_path"));
    }
    Ok(())
}

fn invalid_field(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}
