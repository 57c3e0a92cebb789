use crate::model::event_result::EventApplyOutcome;
use crate::model::ingredient::Ingredient;
use crate::model::potion::{BrewPhase, PotionOutcome, PotionState};

pub const MAX_INGREDIENTS: usize = 5;

/// Points granted for every finished brew.
pub const BREW_BONUS: i64 = 25;

/// Linear brew progress in percent, clamped to 100.
pub fn brew_progress(elapsed_ms: u128, duration_ms: u64) -> f32 {
    if duration_ms == 0 {
        return 100.0;
    }
    ((elapsed_ms as f64 / duration_ms as f64) * 100.0).min(100.0) as f32
}

/* =========================
   Transitions
   ========================= */

impl PotionState {
    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> EventApplyOutcome {
        match self.phase() {
            BrewPhase::Brewing => EventApplyOutcome::rejected("the cauldron is brewing"),
            BrewPhase::Complete => EventApplyOutcome::rejected("empty the finished potion first"),
            BrewPhase::Idle | BrewPhase::Loaded if self.ingredients.len() >= MAX_INGREDIENTS => {
                EventApplyOutcome::rejected(format!(
                    "the cauldron already holds {MAX_INGREDIENTS} ingredients"
                ))
            }
            BrewPhase::Idle | BrewPhase::Loaded => {
                self.ingredients.push(ingredient);
                EventApplyOutcome::Applied
            }
        }
    }

    /// Starts a brew and returns the ingredients to send off, or `None` when
    /// the cauldron is empty or already brewing.
    pub fn begin_stir(&mut self) -> Option<Vec<Ingredient>> {
        if self.ingredients.is_empty() || self.is_stirring {
            return None;
        }

        self.is_stirring = true;
        self.is_complete = false;
        self.result = None;
        Some(self.ingredients.clone())
    }

    pub fn complete(&mut self, outcome: PotionOutcome) -> EventApplyOutcome {
        if !self.is_stirring {
            return EventApplyOutcome::rejected("no brew in flight");
        }

        self.is_stirring = false;
        self.is_complete = true;
        self.result = Some(outcome);
        EventApplyOutcome::Applied
    }

    /// Back to `Loaded`; the selected ingredients stay for a retry.
    pub fn abort(&mut self) -> EventApplyOutcome {
        if !self.is_stirring {
            return EventApplyOutcome::rejected("no brew in flight");
        }

        self.is_stirring = false;
        self.is_complete = false;
        self.result = None;
        EventApplyOutcome::Applied
    }

    pub fn reset(&mut self) -> EventApplyOutcome {
        if self.is_stirring {
            return EventApplyOutcome::rejected("cannot empty the cauldron mid-brew");
        }

        *self = PotionState::default();
        EventApplyOutcome::Applied
    }
}
