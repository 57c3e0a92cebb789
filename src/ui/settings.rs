use serde::{Deserialize, Serialize};
use egui::Color32;
use std::collections::HashMap;

use wizard_lab::model::message::Role;

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Role → bubble color
    pub bubble_colors: HashMap<String, [u8; 4]>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut bubble_colors = HashMap::new();

        bubble_colors.insert("User".into(), [109, 40, 217, 210]);
        bubble_colors.insert("Assistant".into(), [30, 41, 59, 240]);

        Self {
            ui_scale: 1.0,
            bubble_colors,
        }
    }
}

impl UiSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.bubble_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, key: &str, color: Color32) {
        self.bubble_colors.insert(
            key.to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }

    pub fn role_color(&self, role: Role) -> Color32 {
        self.color(role_key(role))
    }
}

pub fn role_key(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}
