//! S3 adapter for the `ObjectStorage` port using path-style addressing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::sigv4::{Credentials, QueryRequest, presign_query, uri_encode};
use crate::domain::ports::{ObjectStorage, ObjectStorageError, PresignRequest};
use crate::outbound::http_body::body_preview;

/// Validity of the URL used internally for deletes.
const DELETE_URL_TTL_SECS: u64 = 60;

/// Bucket location and credentials.
#[derive(Clone)]
pub struct S3Config {
    /// Bucket holding workspace logos.
    pub bucket: String,
    /// Signing region.
    pub region: String,
    /// Service endpoint; AWS's regional endpoint when `None`.
    pub endpoint: Option<Url>,
    pub access_key_id: String,
    pub secret_access_key: Zeroizing<String>,
    pub session_token: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Object storage backed by an S3-compatible service.
pub struct S3ObjectStorage {
    client: Client,
    config: S3Config,
    endpoint: Url,
    host: String,
    clock: Arc<dyn Clock>,
}

impl S3ObjectStorage {
    /// Build the adapter with a request timeout for deletes.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint has no host or the HTTP client
    /// cannot be constructed.
    pub fn new(
        config: S3Config,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ObjectStorageError> {
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(&format!("https://s3.{}.amazonaws.com", config.region))
                .map_err(|err| ObjectStorageError::signing(err.to_string()))?,
        };
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(ObjectStorageError::signing(format!(
                    "endpoint {endpoint} has no host"
                )));
            }
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ObjectStorageError::transport(err.to_string()))?;
        Ok(Self {
            client,
            config,
            endpoint,
            host,
            clock,
        })
    }

    fn object_url(
        &self,
        method: &str,
        key: &str,
        expires_in: Duration,
        signed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<String, ObjectStorageError> {
        let canonical_path = format!(
            "/{}/{}",
            uri_encode(&self.config.bucket, false),
            uri_encode(key, true)
        );
        let credentials = Credentials {
            access_key_id: &self.config.access_key_id,
            secret_access_key: self.config.secret_access_key.as_str(),
            session_token: self.config.session_token.as_ref().map(|t| t.as_str()),
            region: &self.config.region,
        };
        let request = QueryRequest {
            method,
            host: &self.host,
            canonical_path: &canonical_path,
            expires_in_secs: expires_in.as_secs(),
            signed_at,
        };
        let query = presign_query(&credentials, &request).map_err(ObjectStorageError::signing)?;
        Ok(format!(
            "{scheme}://{host}{canonical_path}?{query}",
            scheme = self.endpoint.scheme(),
            host = self.host,
        ))
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn presign(&self, request: PresignRequest) -> Result<String, ObjectStorageError> {
        self.object_url(
            request.method.as_str(),
            &request.key,
            request.expires_in,
            request.signed_at,
        )
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStorageError> {
        let url = self.object_url(
            "DELETE",
            key,
            Duration::from_secs(DELETE_URL_TTL_SECS),
            self.clock.utc(),
        )?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|err| ObjectStorageError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            debug!(key, status = status.as_u16(), "object deleted");
            return Ok(());
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| ObjectStorageError::transport(err.to_string()))?;
        Err(ObjectStorageError::rejected(
            status.as_u16(),
            body_preview(body.as_ref()),
        ))
    }
}
