//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of utoipa derives; these wrappers mirror their wire
//! shape and register under the domain type names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An external service rejected the call; its HTTP status is reused.
    #[schema(rename = "upstream_error")]
    UpstreamError,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// JSON error envelope returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message.
    #[schema(example = "Task not found")]
    error: String,
    code: ErrorCodeSchema,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// External service that produced the error.
    #[schema(example = "poolManager")]
    service: Option<String>,
    /// HTTP status reported by the external service.
    status: Option<u16>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}
