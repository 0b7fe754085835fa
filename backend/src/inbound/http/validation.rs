//! Shared validation helpers for inbound HTTP adapters.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidJson,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidJson => "invalid_json",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("Missing required field: {name}"),
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Reject absent or blank values.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Parse a required UUID field from a JSON body.
pub(crate) fn require_uuid(value: Option<String>, field: FieldName) -> Result<Uuid, Error> {
    let raw = require_text(value, field)?;
    parse_uuid(&raw, field)
}

fn json_rejection_reason(err: &JsonPayloadError) -> &'static str {
    match err {
        JsonPayloadError::ContentType => "content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "too_large"
        }
        JsonPayloadError::Deserialize(inner) if inner.is_data() => "schema",
        JsonPayloadError::Deserialize(_) => "syntax",
        _ => "payload",
    }
}

/// Map body extraction failures onto the JSON error envelope.
///
/// Serde's message stays in the logs; clients only learn the category.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let reason = json_rejection_reason(&err);
    debug!(path = req.path(), reason, error = %err, "rejected request body");
    Error::invalid_request("Invalid JSON body")
        .with_details(json!({
            "code": ErrorCode::InvalidJson.as_str(),
            "reason": reason,
        }))
        .into()
}

/// JSON extractor configuration shared by every `/api` route.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const TASK_ID: FieldName = FieldName::new("taskId");

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    fn blank_text_is_missing(#[case] value: Option<String>) {
        let err = require_text(value, TASK_ID).expect_err("blank rejected");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "Missing required field: taskId");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "taskId", "code": "missing_field"}))
        );
    }

    #[rstest]
    fn invalid_uuid_reports_value() {
        let err = require_uuid(Some("nope".to_owned()), TASK_ID).expect_err("invalid uuid");
        assert_eq!(err.message(), "taskId must be a valid UUID");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "taskId", "value": "nope", "code": "invalid_uuid"}))
        );
    }

    #[rstest]
    fn valid_uuid_is_parsed() {
        let id = Uuid::from_u128(42);
        assert_eq!(require_uuid(Some(id.to_string()), TASK_ID), Ok(id));
    }

    #[rstest]
    #[case::syntax(
        JsonPayloadError::Deserialize(
            serde_json::from_str::<serde_json::Value>("{not json").expect_err("bad json")
        ),
        "syntax"
    )]
    #[case::schema(
        JsonPayloadError::Deserialize(serde_json::from_str::<u8>("\"x\"").expect_err("wrong type")),
        "schema"
    )]
    #[case::content_type(JsonPayloadError::ContentType, "content_type")]
    #[case::overflow(JsonPayloadError::Overflow { limit: 8 }, "too_large")]
    fn json_rejections_are_categorised(#[case] err: JsonPayloadError, #[case] expected: &str) {
        assert_eq!(json_rejection_reason(&err), expected);
    }
}
