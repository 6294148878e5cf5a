mod openai_completion_repository;
mod openai_moderation_classifier;

pub use openai_completion_repository::OpenAiCompletionRepository;
pub use openai_moderation_classifier::OpenAiModerationClassifier;
