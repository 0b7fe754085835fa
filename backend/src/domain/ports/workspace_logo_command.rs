//! Driving port for workspace logo mutations.
//!
//! Uploads happen directly against object storage: the backend hands out a
//! presigned `PUT` URL, then records the key once the client confirms.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Request for a presigned upload URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUploadRequest {
    pub user_id: UserId,
    pub slug: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// Presigned upload target handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUploadTicket {
    pub presigned_url: String,
    /// Object key the client uploads to and later confirms.
    pub s3_path: String,
    /// Validity of the URL in seconds.
    pub expires_in: u64,
}

/// Confirmation that an upload finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmLogoRequest {
    pub user_id: UserId,
    pub slug: String,
    pub s3_path: String,
}

/// Request to remove the current logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteLogoRequest {
    pub user_id: UserId,
    pub slug: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceLogoCommand: Send + Sync {
    /// Validate the upload and presign a `PUT` URL for it.
    async fn request_upload(&self, request: LogoUploadRequest) -> Result<LogoUploadTicket, Error>;

    /// Record an uploaded object as the workspace logo; returns the stored key.
    async fn confirm_upload(&self, request: ConfirmLogoRequest) -> Result<String, Error>;

    /// Delete the logo object and clear the stored key.
    async fn delete_logo(&self, request: DeleteLogoRequest) -> Result<(), Error>;
}
