//! Port for the object store that holds workspace logos.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Failures raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The request could not be signed.
        Signing { message: String } => "object storage signing failed: {message}",
        /// The store could not be reached.
        Transport { message: String } => "object storage request failed: {message}",
        /// The store answered with a non-success status.
        Rejected { status: u16, message: String } => "object storage rejected request with {status}: {message}",
    }
}

/// HTTP verb a presigned URL authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignMethod {
    /// Download.
    Get,
    /// Upload.
    Put,
}

impl PresignMethod {
    /// HTTP method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

/// Parameters for a presigned URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    /// Verb the URL will be used with.
    pub method: PresignMethod,
    /// Object key.
    pub key: String,
    /// Validity window.
    pub expires_in: Duration,
    /// Signing instant; the window starts here.
    pub signed_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Produce a time-limited URL for direct client access.
    async fn presign(&self, request: PresignRequest) -> Result<String, ObjectStorageError>;

    /// Remove an object. Missing objects are not an error.
    async fn delete_object(&self, key: &str) -> Result<(), ObjectStorageError>;
}
