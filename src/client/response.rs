use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A response as received from the transport, with the body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers errors with `{"detail": "..."}`, or with a list of
/// validation problems (`{"detail": [{"msg": "..."}, ...]}`). Bodies in the
/// `{"error": "..."}` shape are understood as well.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) => (!detail.is_empty()).then(|| detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Some(Value::Null) | None => value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Incorrect username or password"}"#).as_deref(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn validation_detail_joins_messages() {
        let body = r#"{"detail": [
            {"loc": ["body", "username"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "password"], "msg": "field required", "type": "value_error.missing"}
        ]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn error_shaped_body() {
        assert_eq!(
            extract_detail(r#"{"error": "Unauthorized access"}"#).as_deref(),
            Some("Unauthorized access")
        );
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(extract_detail("Bad Gateway"), None);
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
    }
}
