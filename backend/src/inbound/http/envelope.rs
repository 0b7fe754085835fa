//! Success envelopes shared by the JSON endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{ "success": true, "message": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    #[schema(example = "Task deleted successfully")]
    pub message: String,
}

impl MessageEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{ "success": true, "data": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
