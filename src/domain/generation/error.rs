use serde_json::json;

use crate::domain::moderation::SafetyVerdict;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationServiceError {
    #[error("content flagged by moderation")]
    ContentUnsafe(SafetyVerdict),
    #[error("generation provider not configured")]
    Unavailable,
    #[error("generation provider error: {0}")]
    Generation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<GenerationServiceError> for AppError {
    fn from(err: GenerationServiceError) -> Self {
        match err {
            GenerationServiceError::ContentUnsafe(verdict) => {
                let flagged_categories = verdict.flagged_categories();
                let details = json!({
                    "moderation_results": serde_json::to_value(&verdict)
                        .unwrap_or(serde_json::Value::Null),
                    "flagged_categories": flagged_categories,
                    "suggestion": "Please try with different content that follows our community guidelines",
                });
                AppError::ContentUnsafe(details)
            }
            GenerationServiceError::Unavailable => {
                AppError::ServiceUnavailable("generation provider not configured".to_string())
            }
            GenerationServiceError::Generation(msg) => AppError::GenerationFailed(msg),
            GenerationServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
