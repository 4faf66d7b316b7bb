//! HTTP utilities for GCP REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header used to bill API calls to a quota project under user credentials
const QUOTA_PROJECT_HEADER: &str = "x-goog-user-project";

/// A non-success response from a GCP REST API
#[derive(Debug, Clone, thiserror::Error)]
#[error("API request failed: {status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Build an error from a status and the raw response body.
    /// GCP wraps errors as `{"error": {"code": .., "message": ..}}`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        Self {
            status,
            message: sanitize_for_log(&message),
        }
    }

    /// The resource does not exist (or is hidden from the caller as if it did not)
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Find the [`ApiError`] behind an `anyhow` chain, if any
pub fn api_error(error: &anyhow::Error) -> Option<&ApiError> {
    error.chain().find_map(|e| e.downcast_ref::<ApiError>())
}

/// True when the error is the API telling us the resource is absent
pub fn is_not_found(error: &anyhow::Error) -> bool {
    api_error(error).is_some_and(ApiError::is_not_found)
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sinkscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str, quota_project: Option<&str>) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url).bearer_auth(token);
        if let Some(project) = quota_project {
            request = request.header(QUOTA_PROJECT_HEADER, project);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_response(status, &body).into());
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Format a GCP API error for the operator-facing warnings.
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    if let Some(api) = api_error(error) {
        return match api.status.as_u16() {
            403 => "Permission denied. Check your GCP IAM permissions.".to_string(),
            401 => "Authentication failed. Run 'gcloud auth application-default login'.".to_string(),
            404 => "Resource not found.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 => "Invalid request. Check your parameters.".to_string(),
            500 | 503 => "GCP service temporarily unavailable. Please try again.".to_string(),
            _ => "Request failed. Check your network connection and try again.".to_string(),
        };
    }

    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_gcp_message() {
        let body = r#"{"error": {"code": 404, "message": "Not found: Dataset acme:audit_logs", "status": "NOT_FOUND"}}"#;
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(err.message, "Not found: Dataset acme:audit_logs");
    }

    #[test]
    fn test_api_error_falls_back_to_reason() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, "<html>nope</html>");
        assert!(!err.is_not_found());
        assert_eq!(err.message, "Forbidden");
    }

    #[test]
    fn test_not_found_survives_context() {
        let err: anyhow::Error = ApiError::from_response(StatusCode::NOT_FOUND, "").into();
        let err = err.context("Failed to get dataset");
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let out = sanitize_for_log(&body);
        assert!(out.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(out.contains("500 bytes total"));
    }

    #[test]
    fn test_format_gcp_error_permission_denied() {
        let err: anyhow::Error = ApiError::from_response(StatusCode::FORBIDDEN, "").into();
        assert_eq!(
            format_gcp_error(&err),
            "Permission denied. Check your GCP IAM permissions."
        );
    }

    #[test]
    fn test_format_gcp_error_through_context() {
        let err: anyhow::Error = ApiError::from_response(StatusCode::UNAUTHORIZED, "").into();
        let err = err.context("Failed to list sinks");
        assert!(format_gcp_error(&err).contains("gcloud auth application-default login"));
    }

    #[test]
    fn test_format_gcp_error_plain_error_is_cut() {
        let err = anyhow::anyhow!("{}", "transport failure ".repeat(10));
        let out = format_gcp_error(&err);
        assert!(out.starts_with("transport failure"));
        assert!(out.ends_with("..."));
        assert!(out.len() <= 83);
    }
}
