use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::generation::{CompletionRepository, Prompt};

/// OpenAI chat-completions implementation of the completion repository.
/// All `count` candidates come back from a single API call (`n` parameter).
pub struct OpenAiCompletionRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiCompletionRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl CompletionRepository for OpenAiCompletionRepository {
    async fn generate_multiple(
        &self,
        prompt: &Prompt,
        count: u8,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Vec<String>, String> {
        tracing::info!(
            model = %self.model,
            count,
            temperature,
            max_tokens,
            "Calling OpenAI chat completions"
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.as_str())
                .build()
                .map_err(|e| format!("OpenAI request error: {}", e))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.as_str())
                .build()
                .map_err(|e| format!("OpenAI request error: {}", e))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .n(count)
            .build()
            .map_err(|e| format!("OpenAI request error: {}", e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                "OpenAI chat completions call failed"
            );
            format!("OpenAI API error: {}", e)
        })?;

        let completions: Vec<String> = response
            .choices
            .into_iter()
            .map(|choice| choice.message.content.unwrap_or_default())
            .collect();

        tracing::debug!(
            completions = completions.len(),
            "OpenAI completions received"
        );

        Ok(completions)
    }
}
