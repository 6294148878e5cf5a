//! Prompt templates for the two generation modes crossed with three style
//! presets. Pure lookup, no I/O.

use super::{GenerationMode, StylePreset};

/// Structured instruction-plus-context prompt for the generation provider
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Sampling parameters associated with a mode/style pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub expected_count: u8,
    pub max_tokens: u32,
    pub temperature: f32,
}

const PICKUP_SYSTEM_BASE: &str = "You are a witty but respectful dating assistant. Your goal is to help users create engaging conversation starters based on someone's dating profile bio.";

const REPLY_SYSTEM_BASE: &str = "You are helping someone continue a dating conversation. Match their tone and energy while keeping the conversation flowing naturally.";

struct StyleModifier {
    tone: &'static str,
    approach: &'static str,
    avoid: &'static str,
}

fn style_modifier(style: StylePreset) -> StyleModifier {
    match style {
        StylePreset::Safe => StyleModifier {
            tone: "friendly, respectful, and genuine",
            approach: "Focus on shared interests and asking thoughtful questions",
            avoid: "anything that could be seen as inappropriate or overly forward",
        },
        StylePreset::Spicy => StyleModifier {
            tone: "confident, playful, and slightly flirtatious",
            approach: "Use subtle humor and light teasing while remaining respectful",
            avoid: "anything explicit, crude, or disrespectful",
        },
        StylePreset::Funny => StyleModifier {
            tone: "humorous, lighthearted, and entertaining",
            approach: "Use clever wordplay, puns, or situational humor",
            avoid: "offensive jokes or humor at someone's expense",
        },
    }
}

/// Build the prompt for a mode/style pair and the given input text
pub fn build_prompt(mode: GenerationMode, style: StylePreset, context: &str) -> Prompt {
    let style_info = style_modifier(style);

    match mode {
        GenerationMode::Pickup => Prompt {
            system: format!(
                "{base}\n\n\
                 STYLE: {tone}\n\
                 APPROACH: {approach}\n\
                 IMPORTANT: {avoid}\n\n\
                 INSTRUCTIONS:\n\
                 1. Read the person's bio carefully\n\
                 2. Identify 2-3 key interests or personality traits\n\
                 3. Create three distinct conversation starters that reference their bio\n\
                 4. Each should be 15-30 words maximum\n\
                 5. Make them engaging questions or observations that invite a response\n\
                 6. Ensure they feel personalized, not generic\n\n\
                 OUTPUT FORMAT: Return exactly 3 lines, each on a new line, no numbering or bullets.",
                base = PICKUP_SYSTEM_BASE,
                tone = style_info.tone,
                approach = style_info.approach,
                avoid = style_info.avoid,
            ),
            user: format!(
                "USER'S BIO: \"{}\"\n\nGenerate 3 personalized conversation starters based on this bio.",
                context
            ),
        },
        GenerationMode::Reply => Prompt {
            system: format!(
                "{base}\n\n\
                 STYLE: {tone}\n\
                 APPROACH: {approach}\n\
                 IMPORTANT: {avoid}\n\n\
                 INSTRUCTIONS:\n\
                 1. Analyze the conversation flow and tone\n\
                 2. Understand what the other person just said\n\
                 3. Generate 2 different response options that:\n\
                 \x20  - Acknowledge their message\n\
                 \x20  - Keep the conversation going\n\
                 \x20  - Match the established tone\n\
                 \x20  - Ask a follow-up question or share something relevant\n\
                 4. Each response should be 10-25 words\n\
                 5. Make them feel natural and conversational\n\n\
                 OUTPUT FORMAT: Return exactly 2 lines, each on a new line, no numbering or bullets.",
                base = REPLY_SYSTEM_BASE,
                tone = style_info.tone,
                approach = style_info.approach,
                avoid = style_info.avoid,
            ),
            user: format!(
                "RECENT CHAT MESSAGES:\n{}\n\nGenerate 2 natural response options to continue this conversation.",
                context
            ),
        },
    }
}

/// Generation parameters for a mode/style pair. Token budgets leave headroom
/// over the word limits; temperature rises with the playfulness of the style.
pub fn params_for(mode: GenerationMode, style: StylePreset) -> GenerationParams {
    let (expected_count, max_tokens) = match mode {
        GenerationMode::Pickup => (3, 100),
        GenerationMode::Reply => (2, 70),
    };

    let temperature = match style {
        StylePreset::Safe => 0.7,
        StylePreset::Spicy => 0.8,
        StylePreset::Funny => 0.9,
    };

    GenerationParams {
        expected_count,
        max_tokens,
        temperature,
    }
}
