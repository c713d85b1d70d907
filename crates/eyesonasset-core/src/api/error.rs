use serde_json::Value;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session expired or invalid")]
    Unauthorized,

    #[error("Access denied: {}", describe(.detail, .body))]
    AccessDenied { detail: Option<String>, body: String },

    #[error("Resource not found: {}", describe(.detail, .body))]
    NotFound { detail: Option<String>, body: String },

    #[error("Request rejected ({status}): {}", describe(.detail, .body))]
    Rejected {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {}", describe(.detail, .body))]
    ServerError { detail: Option<String>, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn describe(detail: &Option<String>, body: &str) -> String {
    detail.clone().unwrap_or_else(|| body.to_string())
}

/// Pull a user-displayable message out of an error body.
///
/// Accepts `{"detail": "..."}` and the list form
/// `{"detail": [{"msg": "..."}, ...]}` used for request validation errors.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Object(obj) => obj.get("msg").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        let body = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied { detail, body },
            404 => ApiError::NotFound { detail, body },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { detail, body },
            code => ApiError::Rejected {
                status: code,
                detail,
                body,
            },
        }
    }

    /// Backend-provided detail message, if the body carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied { detail, .. }
            | ApiError::NotFound { detail, .. }
            | ApiError::Rejected { detail, .. }
            | ApiError::ServerError { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message suitable for the status line. `fallback` names the failed
    /// operation ("Failed to delete asset") for errors without a detail.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized => "Session expired. Please log in again.".to_string(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::RateLimited => self.to_string(),
            ApiError::NetworkError(_) => {
                format!("{}: unable to reach the server", fallback)
            }
            _ => self
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail":"Ativo não encontrado"}"#).as_deref(),
            Some("Ativo não encontrado")
        );
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"},{"msg":"field required"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn test_extract_detail_absent_or_garbage() {
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"message":"nope"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
        assert_eq!(extract_detail(r#"{"detail":[]}"#), None);
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"gone"}"#),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::Rejected { status: 422, .. }
        ));
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":"Login já registrado"}"#);
        assert_eq!(err.user_message("Failed"), "Login já registrado");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "plain text");
        assert_eq!(err.user_message("Failed to save owner"), "Failed to save owner");
        assert!(err.to_string().contains("plain text"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }
}
