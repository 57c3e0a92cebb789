use crate::error::LlmError;
use crate::model::potion::PotionOutcome;

/// Decode the raw structured-output text of a brew into a typed outcome.
/// All three fields are required strings; anything else is a failed brew.
pub fn decode_potion_outcome(raw: &str) -> Result<PotionOutcome, LlmError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    // Some local models wrap JSON in a fenced block despite the schema
    let body = strip_code_fence(trimmed);

    serde_json::from_str::<PotionOutcome>(body).map_err(LlmError::MalformedOutcome)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
