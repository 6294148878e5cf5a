use std::sync::Arc;

use super::{
    prompts, CompletionRepository, GenerateRequest, GenerateResponse, GenerationMode,
    GenerationServiceError,
};
use crate::domain::moderation::ModerationService;

/// Appended when the provider returns fewer usable lines than expected
const PICKUP_PAD_FALLBACK: &str = "I'd love to know more about you!";
const REPLY_PAD_FALLBACK: &str = "That's interesting! Tell me more.";

/// Substituted for a generated line that fails post-generation moderation.
/// Distinct from the padding text so the two cases stay distinguishable.
const PICKUP_SAFE_FALLBACK: &str = "I'd love to get to know you better!";
const REPLY_SAFE_FALLBACK: &str = "That sounds great!";

/// End-to-end suggestion pipeline: moderate input, build the prompt, generate
/// completions, then post-filter and shape the result to the expected count.
pub struct GenerationService {
    moderation: Arc<ModerationService>,
    completions: Option<Arc<dyn CompletionRepository>>,
}

impl GenerationService {
    pub fn new(
        moderation: Arc<ModerationService>,
        completions: Option<Arc<dyn CompletionRepository>>,
    ) -> Self {
        Self {
            moderation,
            completions,
        }
    }

    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerationServiceError> {
        // Input safety gate: no generation is attempted for unsafe context
        let verdict = self.moderation.moderate(&request.context).await;
        if !verdict.is_safe {
            tracing::warn!(
                flagged = ?verdict.flagged_categories(),
                "Input context flagged by moderation"
            );
            return Err(GenerationServiceError::ContentUnsafe(verdict));
        }

        let prompt = prompts::build_prompt(request.mode, request.style, &request.context);
        let params = prompts::params_for(request.mode, request.style);

        let completions = self
            .completions
            .as_ref()
            .ok_or(GenerationServiceError::Unavailable)?;

        let generated = completions
            .generate_multiple(
                &prompt,
                params.expected_count,
                params.temperature,
                params.max_tokens,
            )
            .await
            .map_err(GenerationServiceError::Generation)?;

        // Flatten completions into one ordered sequence of non-empty lines
        let mut choices: Vec<String> = generated
            .iter()
            .flat_map(|text| text.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        let expected = usize::from(params.expected_count);
        if choices.len() < expected {
            tracing::warn!(
                produced = choices.len(),
                expected,
                "Provider returned fewer usable lines than expected, padding"
            );
            while choices.len() < expected {
                choices.push(pad_fallback(request.mode).to_string());
            }
        }
        choices.truncate(expected);

        // Post-generation re-moderation: individually unsafe entries are
        // replaced, never dropped, so the count stays fixed.
        let mut vetted = Vec::with_capacity(choices.len());
        for choice in choices {
            let verdict = self.moderation.moderate(&choice).await;
            if verdict.is_safe {
                vetted.push(choice);
            } else {
                tracing::warn!(
                    flagged = ?verdict.flagged_categories(),
                    "Generated choice flagged by moderation, substituting fallback"
                );
                vetted.push(safe_fallback(request.mode).to_string());
            }
        }

        tracing::info!(choices = vetted.len(), "Generation complete");

        Ok(GenerateResponse {
            choices: vetted,
            style: request.style,
            mode: request.mode,
        })
    }
}

fn pad_fallback(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Pickup => PICKUP_PAD_FALLBACK,
        GenerationMode::Reply => REPLY_PAD_FALLBACK,
    }
}

fn safe_fallback(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Pickup => PICKUP_SAFE_FALLBACK,
        GenerationMode::Reply => REPLY_SAFE_FALLBACK,
    }
}
