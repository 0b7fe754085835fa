//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the serialised shape is the JSON error envelope returned to
//! clients (`{ "error": ..., "code": ... }`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with the current resource state.
    Conflict,
    /// A dependency such as the database is temporarily unavailable.
    ServiceUnavailable,
    /// An external service rejected the call; its status is passed through.
    UpstreamError,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use hive_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Task not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "Task not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    service: Option<String>,
    upstream_status: Option<u16>,
    details: Option<Value>,
    exposed: bool,
}

impl Error {
    /// Create a new error, capturing the trace identifier in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            service: None,
            upstream_status: None,
            details: None,
            exposed: false,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier, when one was in scope.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Name of the external service that produced the error.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// HTTP status reported by the external service.
    pub fn upstream_status(&self) -> Option<u16> {
        self.upstream_status
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether an internal error's message may be shown to clients.
    pub fn is_exposed(&self) -> bool {
        self.exposed || self.code != ErrorCode::InternalError
    }

    /// Attach a trace identifier to the error.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "taskId" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Error reported by an external service, passed through to the client.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::{Error, ErrorCode};
    ///
    /// let err = Error::upstream(409, "poolManager", "pool already exists");
    /// assert_eq!(err.code(), ErrorCode::UpstreamError);
    /// assert_eq!(err.upstream_status(), Some(409));
    /// assert_eq!(err.service(), Some("poolManager"));
    /// ```
    pub fn upstream(status: u16, service: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new(ErrorCode::UpstreamError, message);
        error.service = Some(service.into());
        error.upstream_status = Some(status);
        error
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    ///
    /// The message is for logs only; adapters replace it before responding.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Internal error with a client-safe message.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::Error;
    ///
    /// assert!(Error::failed("Failed to create pool").is_exposed());
    /// assert!(!Error::internal("pool manager timed out").is_exposed());
    /// ```
    pub fn failed(message: impl Into<String>) -> Self {
        let mut error = Self::new(ErrorCode::InternalError, message);
        error.exposed = true;
        error
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape of [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    error: String,
    code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            error: value.message,
            code: value.code,
            trace_id: value.trace_id,
            service: value.service,
            status: value.upstream_status,
            details: value.details,
        }
    }
}

/// Rejection raised when decoding an error envelope with a blank message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error message must not be empty")]
pub struct EmptyErrorMessage;

impl TryFrom<ErrorDto> for Error {
    type Error = EmptyErrorMessage;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        if value.error.trim().is_empty() {
            return Err(EmptyErrorMessage);
        }
        Ok(Self {
            code: value.code,
            message: value.error,
            trace_id: value.trace_id,
            service: value.service,
            upstream_status: value.status,
            details: value.details,
            exposed: true,
        })
    }
}
