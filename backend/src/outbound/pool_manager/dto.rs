//! Wire shapes of Pool Manager responses.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ClaimedPod;
use crate::domain::ports::PoolSummary;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClaimedPodDto {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    port_mappings: BTreeMap<String, String>,
}

impl From<ClaimedPodDto> for ClaimedPod {
    fn from(dto: ClaimedPodDto) -> Self {
        Self {
            id: dto.id,
            url: dto.url,
            port_mappings: dto.port_mappings,
        }
    }
}

/// Error body; either field may carry the human-readable message.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBodyDto {
    pub(super) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Split a created-pool object into its id, name, and remaining fields.
///
/// A missing name falls back to the one that was requested.
pub(super) fn pool_summary(
    mut fields: Map<String, Value>,
    requested_name: &str,
) -> Result<PoolSummary, String> {
    let id = match fields.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        Some(other) => return Err(format!("pool id has unexpected type: {other}")),
    };
    let name = match fields.remove("name") {
        None | Some(Value::Null) => requested_name.to_owned(),
        Some(Value::String(name)) => name,
        Some(other) => return Err(format!("pool name has unexpected type: {other}")),
    };
    Ok(PoolSummary {
        id,
        name,
        extra: fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    fn summary_keeps_unknown_fields() {
        let summary = pool_summary(
            object(json!({ "id": 7, "name": "swarm-1", "status": "provisioning" })),
            "ignored",
        )
        .expect("summary");
        assert_eq!(summary.id.as_deref(), Some("7"));
        assert_eq!(summary.name, "swarm-1");
        assert_eq!(summary.extra.get("status"), Some(&json!("provisioning")));
    }

    #[rstest]
    fn summary_falls_back_to_requested_name() {
        let summary = pool_summary(object(json!({})), "swarm-1").expect("summary");
        assert_eq!(summary.id, None);
        assert_eq!(summary.name, "swarm-1");
    }

    #[rstest]
    fn summary_rejects_non_text_names() {
        assert!(pool_summary(object(json!({ "name": ["a"] })), "x").is_err());
    }

    #[rstest]
    #[case(json!({ "error": "quota exceeded" }), Some("quota exceeded"))]
    #[case(json!({ "message": "bad key" }), Some("bad key"))]
    #[case(json!({ "error": "  ", "detail": "x" }), None)]
    fn error_message_prefers_error_field(#[case] body: Value, #[case] expected: Option<&str>) {
        let dto: ErrorBodyDto = serde_json::from_value(body).expect("decode");
        assert_eq!(dto.into_message().as_deref(), expected);
    }
}
