use serde::Serialize;

use crate::engine::unlock::{available_ingredients, unlock_tier, UnlockTracker};
use crate::model::character::Character;
use crate::model::ingredient::Ingredient;
use crate::model::message::Message;
use crate::model::potion::{MasteredPotion, MasteredRegistry, PotionState};

/// Authoritative state of the lab. Owned by the engine and only
/// mutated through `apply_event`.
#[derive(Debug, Clone)]
pub struct LabState {
    pub character: Character,

    /// House points; unbounded in both directions
    pub score: i64,

    pub messages: Vec<Message>,
    pub is_typing: bool,

    pub potion: PotionState,
    pub brew_progress: f32,
    pub mastered: MasteredRegistry,

    pub unlocks: UnlockTracker,
}

impl LabState {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            score: 0,
            messages: vec![Message::assistant(character.initial_message)],
            is_typing: false,
            potion: PotionState::default(),
            brew_progress: 0.0,
            mastered: MasteredRegistry::default(),
            unlocks: UnlockTracker::default(),
        }
    }
}

impl Default for LabState {
    fn default() -> Self {
        Self::new(Character::default())
    }
}

/// A full copy of the lab sent to the UI after every applied change.
/// This is READ-ONLY outside the engine.
#[derive(Debug, Clone, Serialize)]
pub struct LabSnapshot {
    pub score: i64,
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub potion: PotionState,
    pub brew_progress: f32,
    pub mastered: Vec<MasteredPotion>,
    pub available_ingredients: Vec<Ingredient>,
    pub unlock_tier: usize,
}

impl LabSnapshot {
    /// Drives the warning styling of the score badge.
    pub fn is_score_negative(&self) -> bool {
        self.score < 0
    }

    pub fn can_add_ingredient(&self) -> bool {
        !self.potion.is_stirring
            && !self.potion.is_complete
            && self.potion.ingredients.len() < crate::engine::brew::MAX_INGREDIENTS
    }

    pub fn can_stir(&self) -> bool {
        !self.potion.ingredients.is_empty() && !self.potion.is_stirring
    }
}

impl From<&LabState> for LabSnapshot {
    fn from(state: &LabState) -> Self {
        LabSnapshot {
            score: state.score,
            messages: state.messages.clone(),
            is_typing: state.is_typing,
            potion: state.potion.clone(),
            brew_progress: state.brew_progress,
            mastered: state.mastered.entries().to_vec(),
            available_ingredients: available_ingredients(state.score),
            unlock_tier: unlock_tier(state.score),
        }
    }
}

impl Default for LabSnapshot {
    fn default() -> Self {
        LabSnapshot::from(&LabState::default())
    }
}
