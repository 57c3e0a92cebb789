use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::{timeout, Instant};

use wizard_lab::config::BrewTiming;
use wizard_lab::engine::apply_event::CHAT_FALLBACK_REPLY;
use wizard_lab::engine::engine::{Engine, EngineHandle};
use wizard_lab::engine::llm_client::LlmBackend;
use wizard_lab::engine::protocol::{EngineCommand, EngineResponse};
use wizard_lab::error::LlmError;
use wizard_lab::model::character::Character;
use wizard_lab::model::lab_state::LabSnapshot;
use wizard_lab::model::message::{Message, Role};
use wizard_lab::model::potion::BrewPhase;

/* =========================
   Scripted backend
   ========================= */

#[derive(Default)]
struct ScriptedBackend {
    chat_replies: Mutex<VecDeque<Result<String, LlmError>>>,
    brew_replies: Mutex<VecDeque<Result<String, LlmError>>>,
    chat_latency: Duration,
    brew_latency: Duration,
    chat_calls: AtomicUsize,
    brew_calls: AtomicUsize,
    last_system_instruction: Mutex<Option<String>>,
}

impl ScriptedBackend {
    fn with_chat(self, reply: &str) -> Self {
        self.chat_replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    fn with_chat_error(self) -> Self {
        self.chat_replies.lock().unwrap().push_back(Err(LlmError::Status {
            status: 503,
            body: "overloaded".into(),
        }));
        self
    }

    fn with_brew(self, title: &str) -> Self {
        let json = format!(r##"{{"title":"{title}","description":"It shimmers.","color":"#22d3ee"}}"##);
        self.brew_replies.lock().unwrap().push_back(Ok(json));
        self
    }

    fn with_brew_text(self, raw: &str) -> Self {
        self.brew_replies.lock().unwrap().push_back(Ok(raw.to_string()));
        self
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn chat(&self, _history: &[Message], system_instruction: &str) -> Result<String, LlmError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_instruction.lock().unwrap() = Some(system_instruction.to_string());
        tokio::time::sleep(self.chat_latency).await;
        let next = self.chat_replies.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyResponse))
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        _system_instruction: &str,
        _schema: &Value,
    ) -> Result<String, LlmError> {
        self.brew_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.brew_latency).await;
        let next = self.brew_replies.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyResponse))
    }

    async fn test_connection(&self) -> Result<String, LlmError> {
        Ok("Connected (1 models available)".into())
    }
}

/* =========================
   Helpers
   ========================= */

fn start(backend: Arc<ScriptedBackend>) -> EngineHandle {
    let (engine, handle) = Engine::new(backend, Character::default(), BrewTiming::default());
    tokio::spawn(engine.run());
    handle
}

fn send(handle: &EngineHandle, cmd: EngineCommand) {
    handle.commands.send(cmd).expect("engine stopped");
}

/// Drains responses until a snapshot satisfies `done`, returning it along
/// with every non-snapshot response seen on the way.
async fn wait_for(
    handle: &mut EngineHandle,
    mut done: impl FnMut(&LabSnapshot) -> bool,
) -> (LabSnapshot, Vec<EngineResponse>) {
    let mut seen = Vec::new();
    let search = async {
        loop {
            match handle.responses.recv().await {
                Some(EngineResponse::Snapshot(snapshot)) => {
                    if done(&snapshot) {
                        return *snapshot;
                    }
                }
                Some(other) => seen.push(other),
                None => panic!("engine stopped"),
            }
        }
    };

    let snapshot = timeout(Duration::from_secs(60), search)
        .await
        .expect("timed out waiting for snapshot");
    (snapshot, seen)
}

fn reply_count(snapshot: &LabSnapshot) -> usize {
    snapshot
        .messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count()
}

/* =========================
   Conversation
   ========================= */

#[tokio::test(start_paused = true)]
async fn rude_reply_pushes_score_negative() {
    let backend = Arc::new(ScriptedBackend::default().with_chat("Rude! Minus 50 points."));
    let mut handle = start(backend.clone());

    send(&handle, EngineCommand::SendMessage("you are boring".into()));
    let (snapshot, _) = wait_for(&mut handle, |s| !s.is_typing && reply_count(s) == 2).await;

    assert_eq!(snapshot.score, -50);
    assert!(snapshot.is_score_negative());
    assert_eq!(snapshot.unlock_tier, 0);
    assert_eq!(snapshot.messages.len(), 3);

    let instruction = backend.last_system_instruction.lock().unwrap().clone().unwrap();
    assert!(instruction.contains("CURRENT SCORE: 0."));
}

#[tokio::test(start_paused = true)]
async fn failed_chat_uses_fallback_reply() {
    let backend = Arc::new(ScriptedBackend::default().with_chat_error());
    let mut handle = start(backend);

    send(&handle, EngineCommand::SendMessage("hello?".into()));
    let (snapshot, _) = wait_for(&mut handle, |s| !s.is_typing && reply_count(s) == 2).await;

    assert_eq!(snapshot.score, 0);
    assert_eq!(
        snapshot.messages.last().map(|m| m.content.as_str()),
        Some(CHAT_FALLBACK_REPLY)
    );
}

#[tokio::test(start_paused = true)]
async fn second_message_while_waiting_is_dropped() {
    let backend = Arc::new(ScriptedBackend {
        chat_latency: Duration::from_secs(1),
        ..ScriptedBackend::default()
    }
    .with_chat("Good question."));
    let mut handle = start(backend.clone());

    send(&handle, EngineCommand::SendMessage("first".into()));
    send(&handle, EngineCommand::SendMessage("second".into()));
    let (snapshot, _) = wait_for(&mut handle, |s| !s.is_typing && reply_count(s) == 2).await;

    assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[1].content, "first");
}

#[tokio::test(start_paused = true)]
async fn crossing_a_tier_sends_one_unlock_notification() {
    let backend = Arc::new(ScriptedBackend::default().with_chat("Superb! Award 420 points!"));
    let mut handle = start(backend);

    send(&handle, EngineCommand::SendMessage("Quiz me".into()));
    let (snapshot, seen) = wait_for(&mut handle, |s| s.score != 0).await;

    assert_eq!(snapshot.unlock_tier, 2);
    assert_eq!(snapshot.available_ingredients.len(), 6);

    let notes: Vec<_> = seen
        .iter()
        .filter_map(|r| match r {
            EngineResponse::Notification(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(notes, vec!["✨ Unlocked: Swamp Water 🧪"]);
}

/* =========================
   Brewing
   ========================= */

#[tokio::test(start_paused = true)]
async fn brew_completes_only_after_the_timer() {
    let backend = Arc::new(ScriptedBackend::default().with_brew("Elixir of Dawn"));
    let mut handle = start(backend);

    send(&handle, EngineCommand::AddIngredient { id: "1".into() });
    send(&handle, EngineCommand::AddIngredient { id: "2".into() });
    let started = Instant::now();
    send(&handle, EngineCommand::StirPotion);

    let (snapshot, seen) = wait_for(&mut handle, |s| s.potion.is_complete).await;

    assert!(started.elapsed() >= Duration::from_millis(2500));
    assert_eq!(snapshot.potion.phase(), BrewPhase::Complete);
    assert_eq!(snapshot.score, 25);
    assert_eq!(snapshot.brew_progress, 0.0);
    assert_eq!(snapshot.mastered.len(), 1);
    assert_eq!(
        snapshot.potion.result.as_ref().map(|r| r.title.as_str()),
        Some("Elixir of Dawn")
    );

    let ticks: Vec<f32> = seen
        .iter()
        .filter_map(|r| match r {
            EngineResponse::BrewProgress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ticks.last().copied(), Some(100.0));
}

#[tokio::test(start_paused = true)]
async fn slow_outcome_holds_completion() {
    let backend = Arc::new(ScriptedBackend {
        brew_latency: Duration::from_secs(4),
        ..ScriptedBackend::default()
    }
    .with_brew("Slow Draught"));
    let mut handle = start(backend);

    send(&handle, EngineCommand::AddIngredient { id: "3".into() });
    let started = Instant::now();
    send(&handle, EngineCommand::StirPotion);

    wait_for(&mut handle, |s| s.potion.is_complete).await;
    assert!(started.elapsed() >= Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn stirring_twice_sends_one_request() {
    let backend = Arc::new(ScriptedBackend::default().with_brew("Single Brew").with_brew("Ghost Brew"));
    let mut handle = start(backend.clone());

    send(&handle, EngineCommand::AddIngredient { id: "4".into() });
    send(&handle, EngineCommand::StirPotion);
    send(&handle, EngineCommand::StirPotion);

    let (snapshot, _) = wait_for(&mut handle, |s| s.potion.is_complete).await;

    assert_eq!(backend.brew_calls.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.score, 25);
}

#[tokio::test(start_paused = true)]
async fn malformed_outcome_reverts_to_loaded() {
    let backend = Arc::new(ScriptedBackend::default().with_brew_text(r#"{"title":"No colour"}"#));
    let mut handle = start(backend);

    send(&handle, EngineCommand::AddIngredient { id: "1".into() });
    send(&handle, EngineCommand::StirPotion);

    let mut saw_brewing = false;
    let (snapshot, _) = wait_for(&mut handle, |s| {
        saw_brewing |= s.potion.is_stirring;
        saw_brewing && !s.potion.is_stirring
    })
    .await;

    assert_eq!(snapshot.potion.phase(), BrewPhase::Loaded);
    assert_eq!(snapshot.potion.ingredients.len(), 1);
    assert_eq!(snapshot.brew_progress, 0.0);
    assert_eq!(snapshot.score, 0);
    assert!(snapshot.mastered.is_empty());
}

#[tokio::test(start_paused = true)]
async fn titles_differing_in_case_master_once() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_brew("Potion of Focus")
            .with_brew("POTION OF FOCUS"),
    );
    let mut handle = start(backend);

    send(&handle, EngineCommand::AddIngredient { id: "2".into() });
    send(&handle, EngineCommand::StirPotion);
    wait_for(&mut handle, |s| s.potion.is_complete).await;

    send(&handle, EngineCommand::EmptyCauldron);
    send(&handle, EngineCommand::AddIngredient { id: "3".into() });
    send(&handle, EngineCommand::StirPotion);
    let (snapshot, _) = wait_for(&mut handle, |s| s.potion.is_complete && s.score == 50).await;

    assert_eq!(snapshot.mastered.len(), 1);
    assert_eq!(snapshot.mastered[0].title, "Potion of Focus");
}

#[tokio::test(start_paused = true)]
async fn sixth_ingredient_is_ignored() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut handle = start(backend);

    for id in ["1", "2", "3", "4", "1", "2"] {
        send(&handle, EngineCommand::AddIngredient { id: id.into() });
    }
    send(&handle, EngineCommand::SendMessage("ping".into()));

    // The chat turn is processed after every ingredient command
    let (snapshot, _) = wait_for(&mut handle, |s| s.is_typing).await;
    assert_eq!(snapshot.potion.ingredients.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn connection_test_reports_back() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut handle = start(backend);

    send(&handle, EngineCommand::TestConnection);

    let status = timeout(Duration::from_secs(5), async {
        loop {
            if let Some(EngineResponse::ConnectionStatus(status)) = handle.responses.recv().await {
                return status;
            }
        }
    })
    .await
    .expect("no connection status");

    assert_eq!(status, Ok("Connected (1 models available)".to_string()));
}
