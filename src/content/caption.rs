//! Caption polishing

pub const MIN_DESCRIPTION_CHARS: usize = 5;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

pub const CAPTION_SYSTEM_PROMPT: &str = "You are a social media copywriter. \
     The user will give a short description of a post in about 20 words. \
     Return only one polished, engaging social media caption (1-3 sentences) \
     suitable for Instagram, LinkedIn, or Twitter. \
     No other text, no quotes, no explanation.";

/// Trim and truncate the description, or `None` when it is too short
pub fn prepare_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
        return None;
    }
    Some(trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect())
}
