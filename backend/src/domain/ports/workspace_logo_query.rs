//! Driving port for reading a workspace logo.
use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Request for a download URL of the current logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUrlRequest {
    pub user_id: UserId,
    pub slug: String,
}

/// Presigned download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUrl {
    pub presigned_url: String,
    /// Validity of the URL in seconds.
    pub expires_in: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceLogoQuery: Send + Sync {
    /// Presign a `GET` URL for the current logo.
    async fn logo_url(&self, request: LogoUrlRequest) -> Result<LogoUrl, Error>;
}
