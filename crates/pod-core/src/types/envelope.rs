//! Response envelope returned to the hosting environment.

use serde::{Deserialize, Serialize};

use crate::error::PodError;

/// Status code plus a JSON body, serialized as `{ statusCode, body }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    /// Always valid JSON text
    pub body: String,
}

impl ResponseEnvelope {
    /// 200 response with `value` serialized as the body
    ///
    /// Falls back to a 500 error envelope if `value` cannot be serialized.
    pub fn ok_json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status_code: 200,
                body,
            },
            Err(e) => Self::error(500, e.to_string()),
        }
    }

    /// Failure response with body `{"error": message}`
    pub fn error(status_code: u16, message: impl AsRef<str>) -> Self {
        Self {
            status_code,
            body: serde_json::json!({ "error": message.as_ref() }).to_string(),
        }
    }

    /// Failure response derived from a PodError
    pub fn from_error(error: &PodError) -> Self {
        Self::error(error.status_code(), error.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let envelope = ResponseEnvelope::error(500, "Storage error.");
        assert_eq!(envelope.status_code, 500);
        assert_eq!(envelope.body, r#"{"error":"Storage error."}"#);
        assert!(!envelope.is_success());
    }

    #[test]
    fn test_error_body_escapes_message() {
        let envelope = ResponseEnvelope::error(502, "bad \"gateway\"\n");
        let parsed: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(parsed["error"], "bad \"gateway\"\n");
    }

    #[test]
    fn test_ok_json() {
        let envelope = ResponseEnvelope::ok_json(&serde_json::json!({ "name": "foo" }));
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, r#"{"name":"foo"}"#);
        assert!(envelope.is_success());
    }

    #[test]
    fn test_from_error() {
        let envelope = ResponseEnvelope::from_error(&PodError::upstream(404, "Not found"));
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.body, r#"{"error":"Not found"}"#);
    }

    #[test]
    fn test_wire_shape() {
        let envelope = ResponseEnvelope::error(500, "Npm error.");
        let text = serde_json::to_string(&envelope).unwrap();
        assert_eq!(text, r#"{"statusCode":500,"body":"{\"error\":\"Npm error.\"}"}"#);
    }
}
