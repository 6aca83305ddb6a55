use serde::Deserialize;

/// Error body returned by both the Upload and Admin APIs.
///
/// ```json
/// {"error": {"message": "Resource not found - docs/report.pdf"}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

impl ApiErrorBody {
    /// Extract the error message from a raw body, if it has the expected
    /// shape.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .map(|parsed| parsed.error.message)
    }
}

/// Response from the Admin API `ping` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PingResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message() {
        let body = r#"{"error":{"message":"Resource not found - sample"}}"#;
        assert_eq!(
            ApiErrorBody::message_from(body).as_deref(),
            Some("Resource not found - sample")
        );
    }

    #[test]
    fn error_body_rejects_other_shapes() {
        assert!(ApiErrorBody::message_from("<html>bad gateway</html>").is_none());
        assert!(ApiErrorBody::message_from(r#"{"message":"flat"}"#).is_none());
    }

    #[test]
    fn ping_response() {
        let resp: PingResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(resp.status, "ok");
    }
}
