use serde::Serialize;

/// The companion persona the chat is played against.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Character {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub initial_message: &'static str,
    pub system_instruction: &'static str,
}

pub const CHARACTERS: [Character; 1] = [Character {
    id: "hogwarts_lab",
    name: "Hogwarts Potion Laboratory",
    role: "Your Magic Workshop",
    initial_message: "*The room glows with a soft light.* Welcome back to the Laboratory! \
        Earn 200 points to unlock new rare ingredients. Pick your components and let the magic begin!",
    system_instruction: "You are the friendly spirit of the Hogwarts Potion Laboratory. \
        You speak clearly for teenagers. Be supportive. If they earn points, congratulate them. \
        If they lose points for rudeness, remind them that discipline is part of magic. \
        Mention that 200 points unlocks new ingredients!",
}];

impl Default for Character {
    fn default() -> Self {
        CHARACTERS[0]
    }
}
