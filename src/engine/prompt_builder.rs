use serde_json::{json, Value};

use crate::model::character::Character;
use crate::model::ingredient::Ingredient;

/// Reply length cap appended to every chat instruction.
pub const MAX_REPLY_WORDS: u32 = 120;

pub const BREW_SYSTEM_INSTRUCTION: &str = "JSON: {title, description, color}.";

/// Formats the text sent to the model. No networking, no state.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Persona instruction with the live score and the length constraint.
    pub fn chat_system_instruction(character: &Character, score: i64) -> String {
        format!(
            "{} CURRENT SCORE: {}. CRITICAL: Max {} words.",
            character.system_instruction, score, MAX_REPLY_WORDS
        )
    }

    pub fn brew_prompt(ingredients: &[Ingredient]) -> String {
        let names = ingredients
            .iter()
            .map(|i| i.name)
            .collect::<Vec<_>>()
            .join(", ");

        format!("Ingredients: {names}. Outcome?")
    }
}

/// JSON schema every brew outcome must satisfy.
pub fn potion_outcome_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "color": { "type": "string" }
        },
        "required": ["title", "description", "color"],
        "additionalProperties": false
    })
}
