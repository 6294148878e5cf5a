pub mod error;
pub mod prompts;
pub mod service;

pub use error::GenerationServiceError;
pub use prompts::{GenerationParams, Prompt};
pub use service::GenerationService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generation mode: opening lines from a bio, or replies to a chat excerpt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Pickup,
    Reply,
}

/// Style preset controlling tone guidance and sampling temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Safe,
    Spicy,
    Funny,
}

/// Request body for POST /v1/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub mode: GenerationMode,
    #[serde(default)]
    pub style: StylePreset,
    pub context: String,
}

/// Response body for POST /v1/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub choices: Vec<String>,
    pub style: StylePreset,
    pub mode: GenerationMode,
}

/// Text-generation provider: `count` independent completions for one prompt,
/// same sampling parameters, provider-returned order, each possibly empty.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    async fn generate_multiple(
        &self,
        prompt: &Prompt,
        count: u8,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Vec<String>, String>;
}
