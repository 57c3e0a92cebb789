use serde::Serialize;

/// A shelf item that can be dropped into the cauldron.
/// Catalog entries are static; nothing creates ingredients at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/* =========================
   Catalog
   ========================= */

/// Always on the shelf.
pub const INITIAL_INGREDIENTS: [Ingredient; 4] = [
    Ingredient {
        id: "1",
        name: "Dragon Scale",
        color: "#ff4d4d",
        icon: "🔥",
        description: "Adds heat and powerful energy.",
    },
    Ingredient {
        id: "2",
        name: "Moonstone Powder",
        color: "#a5f3fc",
        icon: "🌙",
        description: "Gives the potion clarity and light.",
    },
    Ingredient {
        id: "3",
        name: "Root of Mandrake",
        color: "#78350f",
        icon: "🌱",
        description: "Brings strong, earthy magic.",
    },
    Ingredient {
        id: "4",
        name: "Phoenix Feather",
        color: "#fbbf24",
        icon: "🦅",
        description: "Helps things feel new and hopeful.",
    },
];

/// Revealed one at a time, in this order, as the score crosses each tier.
pub const UNLOCKABLE_INGREDIENTS: [Ingredient; 8] = [
    Ingredient {
        id: "5",
        name: "Dried Pixie Dust",
        color: "#d8b4fe",
        icon: "✨",
        description: "Adds a bit of fun and floating magic.",
    },
    Ingredient {
        id: "6",
        name: "Swamp Water",
        color: "#365314",
        icon: "🧪",
        description: "A mysterious, dark base for the brew.",
    },
    Ingredient {
        id: "7",
        name: "Hourglass Sand",
        color: "#eab308",
        icon: "⏳",
        description: "Gives the potion a touch of time magic.",
    },
    Ingredient {
        id: "8",
        name: "Thunderbird Tail",
        color: "#60a5fa",
        icon: "⚡",
        description: "Infuses the potion with storm energy.",
    },
    Ingredient {
        id: "9",
        name: "Unicorn Hair",
        color: "#ffffff",
        icon: "🦄",
        description: "Pure, healing magical core.",
    },
    Ingredient {
        id: "10",
        name: "Void Essence",
        color: "#1e1b4b",
        icon: "🌀",
        description: "Concentrated mystery of the cosmos.",
    },
    Ingredient {
        id: "11",
        name: "Golden Snitch Wing",
        color: "#fcd34d",
        icon: "🏒",
        description: "Adds speed and unpredictable flight.",
    },
    Ingredient {
        id: "12",
        name: "Kraken Ink",
        color: "#0f172a",
        icon: "🐙",
        description: "Deep sea shadows and ancient depth.",
    },
];

/// Looks an ingredient up across both catalogs, ignoring unlock state.
pub fn find_ingredient(id: &str) -> Option<&'static Ingredient> {
    INITIAL_INGREDIENTS
        .iter()
        .chain(UNLOCKABLE_INGREDIENTS.iter())
        .find(|ing| ing.id == id)
}

/// Parses `#rrggbb` (or `rrggbb`) into RGB bytes.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = INITIAL_INGREDIENTS
            .iter()
            .chain(UNLOCKABLE_INGREDIENTS.iter())
            .map(|i| i.id)
            .collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn every_catalog_color_parses() {
        for ing in INITIAL_INGREDIENTS.iter().chain(UNLOCKABLE_INGREDIENTS.iter()) {
            assert!(parse_hex_color(ing.color).is_some(), "{}", ing.name);
        }
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("#ff4d4d"), Some([0xff, 0x4d, 0x4d]));
        assert_eq!(parse_hex_color("a5f3fc"), Some([0xa5, 0xf3, 0xfc]));
        assert_eq!(parse_hex_color("crimson"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn lookup_covers_locked_entries() {
        assert_eq!(find_ingredient("12").map(|i| i.name), Some("Kraken Ink"));
        assert!(find_ingredient("13").is_none());
    }
}
