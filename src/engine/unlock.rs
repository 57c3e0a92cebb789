use serde::Serialize;

use crate::model::ingredient::{Ingredient, INITIAL_INGREDIENTS, UNLOCKABLE_INGREDIENTS};

/// Points needed per unlock tier.
pub const POINTS_PER_TIER: i64 = 200;

/// Number of unlock tiers reached; negative scores sit at tier 0.
pub fn unlock_tier(score: i64) -> usize {
    (score.max(0) / POINTS_PER_TIER) as usize
}

/// Base shelf plus the first `tier` unlockable ingredients.
pub fn available_ingredients(score: i64) -> Vec<Ingredient> {
    let unlocked = unlock_tier(score).min(UNLOCKABLE_INGREDIENTS.len());

    INITIAL_INGREDIENTS
        .iter()
        .chain(UNLOCKABLE_INGREDIENTS[..unlocked].iter())
        .copied()
        .collect()
}

pub fn is_available(score: i64, id: &str) -> bool {
    available_ingredients(score).iter().any(|ing| ing.id == id)
}

/// Remembers the last tier it saw so each upward crossing is announced once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnlockTracker {
    last_tier: usize,
}

impl UnlockTracker {
    /// Records the tier for `score`. When it rose since the last observation,
    /// returns the ingredient at the new boundary; skipped tiers are not
    /// announced. Falling back is remembered too, so re-crossing announces again.
    pub fn observe(&mut self, score: i64) -> Option<&'static Ingredient> {
        let tier = unlock_tier(score);
        let previous = std::mem::replace(&mut self.last_tier, tier);

        if tier > previous {
            UNLOCKABLE_INGREDIENTS.get(tier - 1)
        } else {
            None
        }
    }

    pub fn last_tier(&self) -> usize {
        self.last_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_is_floor_of_clamped_score() {
        for (score, tier) in [(-500, 0), (0, 0), (199, 0), (200, 1), (399, 1), (400, 2), (1_000_000, 5000)] {
            assert_eq!(unlock_tier(score), tier, "score {score}");
        }
    }

    #[test]
    fn tier_never_decreases_with_score() {
        let mut previous = 0;
        for score in (-1000..3000).step_by(7) {
            let tier = unlock_tier(score);
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn shelf_grows_one_per_tier_and_caps() {
        assert_eq!(available_ingredients(-10).len(), 4);
        assert_eq!(available_ingredients(200).len(), 5);
        assert_eq!(available_ingredients(200)[4].name, "Dried Pixie Dust");
        assert_eq!(available_ingredients(100_000).len(), 12);
    }

    #[test]
    fn locked_ingredient_is_unavailable() {
        assert!(is_available(0, "4"));
        assert!(!is_available(0, "5"));
        assert!(is_available(250, "5"));
    }

    #[test]
    fn jump_announces_only_boundary_ingredient() {
        let mut tracker = UnlockTracker::default();
        let announced = tracker.observe(650);
        assert_eq!(announced.map(|i| i.name), Some("Hourglass Sand"));
        assert_eq!(tracker.last_tier(), 3);
        assert!(tracker.observe(700).is_none());
    }

    #[test]
    fn dropping_and_recrossing_announces_again() {
        let mut tracker = UnlockTracker::default();
        assert!(tracker.observe(210).is_some());
        assert!(tracker.observe(150).is_none());
        assert_eq!(tracker.observe(205).map(|i| i.id), Some("5"));
    }

    #[test]
    fn tiers_past_catalog_stay_quiet() {
        let mut tracker = UnlockTracker::default();
        tracker.observe(1600);
        assert!(tracker.observe(1800).is_none());
    }
}
