use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Content flagged by moderation system")]
    ContentUnsafe(Value),

    #[error("Invalid generation mode: {0}")]
    InvalidMode(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Daily quota exceeded")]
    QuotaExceeded {
        usage: u32,
        limit: u32,
        reset_at: DateTime<Utc>,
    },

    #[error("LLM service not available")]
    ServiceUnavailable(String),

    #[error("Failed to generate content")]
    GenerationFailed(String),

    #[error("Internal server error")]
    Internal(String),
}

/// Error response envelope: a stable machine-readable code plus a human
/// message and structured remediation detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Value,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ContentUnsafe(_) | Self::InvalidMode(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) | Self::GenerationFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ContentUnsafe(_) => "CONTENT_UNSAFE",
            Self::InvalidMode(_) => "INVALID_MODE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::GenerationFailed(_) => "GENERATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::ContentUnsafe(details) => details.clone(),
            Self::InvalidMode(_) => json!({ "supported_modes": ["pickup", "reply"] }),
            Self::QuotaExceeded {
                usage,
                limit,
                reset_at,
            } => json!({
                "current_usage": usage,
                "daily_limit": limit,
                "reset_time": reset_at.to_rfc3339(),
                "message": format!(
                    "You have reached your daily limit of {} requests. Please wait until midnight UTC for reset.",
                    limit
                ),
            }),
            Self::ServiceUnavailable(_) => {
                json!({ "message": "AI service is temporarily unavailable" })
            }
            Self::GenerationFailed(_) => json!({ "message": "AI service encountered an error" }),
            Self::Internal(_) => json!({ "message": "An unexpected error occurred" }),
            _ => json!({}),
        }
    }

    /// Headers carried alongside the error body. Quota rejections advertise
    /// the limit and retry timing.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Self::QuotaExceeded { limit, reset_at, .. } = self {
            let retry_after = (*reset_at - Utc::now()).num_seconds().max(0);

            insert_header(&mut headers, "X-RateLimit-Limit", &limit.to_string());
            insert_header(&mut headers, "X-RateLimit-Remaining", "0");
            insert_header(
                &mut headers,
                "X-RateLimit-Reset",
                &reset_at.timestamp().to_string(),
            );
            insert_header(&mut headers, "Retry-After", &retry_after.to_string());
        }

        headers
    }

    /// Convert to the error response envelope
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            details: self.details(),
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(header_value) = HeaderValue::from_str(value) {
        headers.insert(name, header_value);
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.code(),
                status = %status.as_u16(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                code = self.code(),
                status = %status.as_u16(),
                "Request rejected"
            );
        }

        let error_response = self.to_response();
        let headers = self.headers();

        (status, headers, Json(error_response)).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
