//! HTTP DTOs for the webhook and liveness endpoints.

use serde::Serialize;

/// Acknowledgement body for successful requests.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_response_serializes_ok() {
        let json = serde_json::to_value(StatusResponse::ok()).unwrap();
        assert_eq!(json, json!({"status": "ok"}));
    }

    #[test]
    fn error_response_omits_missing_details() {
        let json = serde_json::to_value(ErrorResponse::new("INVALID_SIGNATURE", "Invalid signature"))
            .unwrap();
        assert_eq!(
            json,
            json!({"error_code": "INVALID_SIGNATURE", "message": "Invalid signature"})
        );
    }

    #[test]
    fn error_response_with_details_includes_details() {
        let details = json!({"field": "amount"});
        let response = ErrorResponse::with_details("MALFORMED_PAYLOAD", "Invalid", details.clone());
        assert_eq!(response.details, Some(details));
    }
}
