use serde::{Deserialize, Serialize};

use crate::model::ingredient::Ingredient;

/// Liquid color of an empty cauldron.
pub const EMPTY_LIQUID_COLOR: &str = "#2d3748";

/// Structured result returned by the model for a brew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionOutcome {
    pub title: String,
    pub description: String,
    pub color: String,
}

/// Where the cauldron currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewPhase {
    Idle,
    Loaded,
    Brewing,
    Complete,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PotionState {
    pub ingredients: Vec<Ingredient>,
    pub is_stirring: bool,
    pub is_complete: bool,

    /// Only populated while `is_complete` is set
    pub result: Option<PotionOutcome>,
}

impl PotionState {
    pub fn phase(&self) -> BrewPhase {
        if self.is_stirring {
            BrewPhase::Brewing
        } else if self.is_complete {
            BrewPhase::Complete
        } else if self.ingredients.is_empty() {
            BrewPhase::Idle
        } else {
            BrewPhase::Loaded
        }
    }

    /// Color the cauldron liquid should be drawn with.
    pub fn liquid_color(&self) -> &str {
        match (&self.result, self.ingredients.last()) {
            (Some(result), _) if self.is_complete => result.color.as_str(),
            (_, Some(last)) => last.color,
            _ => EMPTY_LIQUID_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteredPotion {
    pub title: String,
    pub color: String,
}

/// Unique brew results, keyed by case-insensitive title.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MasteredRegistry {
    entries: Vec<MasteredPotion>,
}

impl MasteredRegistry {
    /// Returns `false` when a potion with the same title is already recorded.
    pub fn record(&mut self, outcome: &PotionOutcome) -> bool {
        let key = outcome.title.to_lowercase();
        if self.entries.iter().any(|p| p.title.to_lowercase() == key) {
            return false;
        }

        self.entries.push(MasteredPotion {
            title: outcome.title.clone(),
            color: outcome.color.clone(),
        });
        true
    }

    pub fn entries(&self) -> &[MasteredPotion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
