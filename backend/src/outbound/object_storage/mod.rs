//! S3-compatible object storage adapter.
//!
//! Presigned URLs are produced locally with AWS Signature Version 4; only
//! deletes go over the wire.

mod s3;
mod sigv4;

pub use s3::{S3Config, S3ObjectStorage};
