//! Reqwest-backed Pool Manager client.
//!
//! Owns transport details only: URL construction, bearer authentication,
//! HTTP error mapping, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::{ClaimedPodDto, ErrorBodyDto, pool_summary};
use crate::domain::ClaimedPod;
use crate::domain::ports::{CreatePoolPayload, PoolManager, PoolManagerError, PoolSummary};
use crate::outbound::http_body::body_preview;

/// Pool Manager client bound to one base URL.
pub struct PoolManagerHttpClient {
    client: Client,
    base_url: Url,
}

impl PoolManagerHttpClient {
    /// Build a client with an explicit request timeout.
    /// ```rust,ignore
    /// let client = PoolManagerHttpClient::new(base_url, Duration::from_secs(30))?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, PoolManagerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PoolManagerError::transport(format!("base URL {} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(request: RequestBuilder, api_key: &str) -> Result<Response, PoolManagerError> {
        let response = request
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status.as_u16(), body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> PoolManagerError {
    PoolManagerError::transport(error.to_string())
}

/// Non-success responses keep the upstream status; the JSON body, when there
/// is one, travels along as details.
fn map_status_error(status: u16, body: &[u8]) -> PoolManagerError {
    let details = serde_json::from_slice::<Value>(body).ok();
    let message = details
        .clone()
        .and_then(|value| serde_json::from_value::<ErrorBodyDto>(value).ok())
        .and_then(ErrorBodyDto::into_message)
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {status}")
            } else {
                preview
            }
        });
    PoolManagerError::api(status, message, details)
}

#[async_trait]
impl PoolManager for PoolManagerHttpClient {
    async fn create_pool(
        &self,
        api_key: &str,
        payload: &CreatePoolPayload,
    ) -> Result<PoolSummary, PoolManagerError> {
        let url = self.endpoint(["pools"])?;
        debug!(pool_name = %payload.pool_name, "creating pool");
        let response = Self::send(self.client.post(url).json(payload), api_key).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| PoolManagerError::decode(err.to_string()))?;
        match body {
            Value::Object(fields) => {
                pool_summary(fields, &payload.pool_name).map_err(PoolManagerError::decode)
            }
            other => Err(PoolManagerError::decode(format!(
                "expected a pool object, got {other}"
            ))),
        }
    }

    async fn claim_pod(
        &self,
        api_key: &str,
        pool_name: &str,
    ) -> Result<ClaimedPod, PoolManagerError> {
        let url = self.endpoint(["pools", pool_name, "workspace"])?;
        debug!(pool_name, "claiming pod");
        let response = Self::send(self.client.get(url), api_key).await?;
        let body = response.bytes().await.map_err(map_transport_error)?;
        let pod: ClaimedPodDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            PoolManagerError::decode(format!("invalid claimed pod payload: {err}"))
        })?;
        Ok(pod.into())
    }
}
