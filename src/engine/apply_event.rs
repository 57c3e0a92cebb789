use crate::engine::brew::BREW_BONUS;
use crate::engine::points_parser::parse_points_from_text;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::SoundCue;
use crate::engine::unlock::is_available;
use crate::model::event_result::EventApplyOutcome;
use crate::model::ingredient::{find_ingredient, Ingredient};
use crate::model::lab_state::LabState;
use crate::model::message::Message;
use crate::model::potion::PotionOutcome;

/// Shown in place of a reply when the chat request fails.
pub const CHAT_FALLBACK_REPLY: &str = "Magical interference detected.";

/// Everything that can change the lab, whether it came from the player or
/// from a finished model call.
#[derive(Debug, Clone)]
pub enum LabEvent {
    UserMessage(String),
    ChatReply(String),
    ChatFailed(String),

    AddIngredient(String),
    StirPotion,
    BrewProgress(f32),
    BrewSucceeded(PotionOutcome),
    BrewFailed(String),
    EmptyCauldron,
}

impl LabEvent {
    pub fn short_name(&self) -> &'static str {
        match self {
            LabEvent::UserMessage(_) => "UserMessage",
            LabEvent::ChatReply(_) => "ChatReply",
            LabEvent::ChatFailed(_) => "ChatFailed",
            LabEvent::AddIngredient(_) => "AddIngredient",
            LabEvent::StirPotion => "StirPotion",
            LabEvent::BrewProgress(_) => "BrewProgress",
            LabEvent::BrewSucceeded(_) => "BrewSucceeded",
            LabEvent::BrewFailed(_) => "BrewFailed",
            LabEvent::EmptyCauldron => "EmptyCauldron",
        }
    }
}

/// Work the engine must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Sound(SoundCue),
    Notify(String),
    RequestChat {
        history: Vec<Message>,
        system_instruction: String,
    },
    RequestBrew {
        ingredients: Vec<Ingredient>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventApplication {
    pub outcome: EventApplyOutcome,
    pub effects: Vec<Effect>,
}

impl EventApplication {
    fn applied(effects: Vec<Effect>) -> Self {
        Self {
            outcome: EventApplyOutcome::Applied,
            effects,
        }
    }

    fn from_outcome(outcome: EventApplyOutcome, effects: Vec<Effect>) -> Self {
        if outcome.is_applied() {
            Self { outcome, effects }
        } else {
            Self {
                outcome,
                effects: Vec::new(),
            }
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            outcome: EventApplyOutcome::rejected(reason),
            effects: Vec::new(),
        }
    }
}

/// Apply a LabEvent to the LabState, returning the outcome and follow-up effects
pub fn apply_event(state: &mut LabState, event: LabEvent) -> EventApplication {
    match event {
        LabEvent::UserMessage(text) => {
            if text.trim().is_empty() {
                return EventApplication::rejected("empty message");
            }
            if state.is_typing {
                return EventApplication::rejected("still waiting for the previous reply");
            }

            state.messages.push(Message::user(text));
            state.is_typing = true;

            let system_instruction =
                PromptBuilder::chat_system_instruction(&state.character, state.score);

            EventApplication::applied(vec![Effect::RequestChat {
                history: state.messages.clone(),
                system_instruction,
            }])
        }

        LabEvent::ChatReply(text) => {
            if !state.is_typing {
                return EventApplication::rejected("no chat request outstanding");
            }

            let text = if text.is_empty() { "...".to_string() } else { text };

            let mut effects = Vec::new();
            let delta = parse_points_from_text(&text);
            if delta != 0 {
                effects.push(Effect::Sound(if delta > 0 {
                    SoundCue::Success
                } else {
                    SoundCue::Fail
                }));
                effects.extend(adjust_score(state, delta));
            }

            state.messages.push(Message::assistant(text));
            state.is_typing = false;

            EventApplication::applied(effects)
        }

        LabEvent::ChatFailed(_) => {
            if !state.is_typing {
                return EventApplication::rejected("no chat request outstanding");
            }

            state.messages.push(Message::assistant(CHAT_FALLBACK_REPLY));
            state.is_typing = false;

            EventApplication::applied(Vec::new())
        }

        LabEvent::AddIngredient(id) => {
            let Some(ingredient) = find_ingredient(&id) else {
                return EventApplication::rejected(format!("unknown ingredient '{}'", id));
            };
            if !is_available(state.score, &id) {
                return EventApplication::rejected(format!("'{}' is still locked", ingredient.name));
            }

            let outcome = state.potion.add_ingredient(*ingredient);
            EventApplication::from_outcome(outcome, vec![Effect::Sound(SoundCue::Pop)])
        }

        LabEvent::StirPotion => {
            let Some(ingredients) = state.potion.begin_stir() else {
                return EventApplication::rejected("nothing to stir, or already brewing");
            };

            state.brew_progress = 0.0;

            EventApplication::applied(vec![
                Effect::Sound(SoundCue::Magic),
                Effect::RequestBrew { ingredients },
            ])
        }

        LabEvent::BrewProgress(percent) => {
            if !state.potion.is_stirring {
                return EventApplication::rejected("no brew in flight");
            }

            state.brew_progress = percent.clamp(0.0, 100.0);
            EventApplication::applied(Vec::new())
        }

        LabEvent::BrewSucceeded(outcome) => {
            let applied = state.potion.complete(outcome.clone());
            if !applied.is_applied() {
                return EventApplication::from_outcome(applied, Vec::new());
            }

            state.mastered.record(&outcome);
            state.brew_progress = 0.0;

            let mut effects = vec![Effect::Sound(SoundCue::Success)];
            effects.extend(adjust_score(state, BREW_BONUS));

            EventApplication::applied(effects)
        }

        LabEvent::BrewFailed(_) => {
            let outcome = state.potion.abort();
            if outcome.is_applied() {
                state.brew_progress = 0.0;
            }
            EventApplication::from_outcome(outcome, Vec::new())
        }

        LabEvent::EmptyCauldron => {
            let outcome = state.potion.reset();
            EventApplication::from_outcome(outcome, vec![Effect::Sound(SoundCue::Pop)])
        }
    }
}

/// Applies a point delta and re-evaluates unlocks.
fn adjust_score(state: &mut LabState, delta: i64) -> Vec<Effect> {
    state.score = state.score.saturating_add(delta);

    match state.unlocks.observe(state.score) {
        Some(ingredient) => vec![
            Effect::Sound(SoundCue::Success),
            Effect::Notify(format!("✨ Unlocked: {} {}", ingredient.name, ingredient.icon)),
        ],
        None => Vec::new(),
    }
}
