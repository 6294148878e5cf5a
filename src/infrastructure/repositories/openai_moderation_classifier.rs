use async_openai::{config::OpenAIConfig, types::CreateModerationRequestArgs, Client};
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::moderation::{CategoryScores, ClassifierResponse, ModerationClassifier};

/// OpenAI moderation-endpoint implementation of the content classifier
pub struct OpenAiModerationClassifier {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenAiModerationClassifier {
    pub fn new(client: Arc<Client<OpenAIConfig>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModerationClassifier for OpenAiModerationClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierResponse, String> {
        let request = CreateModerationRequestArgs::default()
            .input(text)
            .build()
            .map_err(|e| format!("moderation_api_error: {}", e))?;

        let response = self
            .client
            .moderations()
            .create(request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "OpenAI moderation call failed");
                format!("moderation_api_error: {}", e)
            })?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| "moderation_api_error: empty results".to_string())?;

        Ok(ClassifierResponse {
            flagged: result.flagged,
            scores: CategoryScores {
                harassment: result.category_scores.harassment as f32,
                sexual: result.category_scores.sexual as f32,
                violence: result.category_scores.violence as f32,
                hate: result.category_scores.hate as f32,
            },
        })
    }
}
