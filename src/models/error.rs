use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable description
    pub message: String,
    /// Stable machine readable error code, e.g. `unauthorized`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_is_optional() {
        let value = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(value, json!({ "message": "boom" }));

        let parsed: ErrorResponse = serde_json::from_value(json!({ "message": "boom" })).unwrap();
        assert_eq!(parsed.code, None);
    }

    #[test]
    fn test_message_is_required() {
        assert!(serde_json::from_value::<ErrorResponse>(json!({ "code": "conflict" })).is_err());
    }

    #[test]
    fn test_with_code() {
        let value = serde_json::to_value(ErrorResponse::with_code("taken", "conflict")).unwrap();
        assert_eq!(value, json!({ "message": "taken", "code": "conflict" }));
    }
}
