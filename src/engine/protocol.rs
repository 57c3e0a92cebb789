use std::sync::Arc;

use crate::engine::llm_client::LlmBackend;
use crate::model::lab_state::LabSnapshot;

/// Requests from the UI.
pub enum EngineCommand {
    SendMessage(String),
    AddIngredient { id: String },
    StirPotion,
    EmptyCauldron,

    /// Swap the model backend; calls already in flight finish on the old one
    ReplaceBackend(Arc<dyn LlmBackend>),
    TestConnection,

    Shutdown,
}

/// Named audio cues. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Pop,
    Success,
    Fail,
    Magic,
}

#[derive(Debug, Clone)]
pub enum EngineResponse {
    Snapshot(Box<LabSnapshot>),

    /// Percent, 0..=100; sent on every timer tick while brewing
    BrewProgress(f32),

    Notification(String),
    Sound(SoundCue),
    ConnectionStatus(Result<String, String>),
}
