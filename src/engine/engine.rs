use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::BrewTiming;
use crate::engine::apply_event::{apply_event, Effect, LabEvent};
use crate::engine::brew::brew_progress;
use crate::engine::llm_client::LlmBackend;
use crate::engine::prompt_builder::{potion_outcome_schema, PromptBuilder, BREW_SYSTEM_INSTRUCTION};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::error::LlmError;
use crate::model::character::Character;
use crate::model::event_result::EventApplyOutcome;
use crate::model::ingredient::Ingredient;
use crate::model::lab_state::{LabSnapshot, LabState};
use crate::model::llm_decode::decode_potion_outcome;
use crate::model::message::Message;
use crate::model::potion::PotionOutcome;

/// UI side of the engine channels.
pub struct EngineHandle {
    pub commands: UnboundedSender<EngineCommand>,
    pub responses: UnboundedReceiver<EngineResponse>,
}

/// Internal traffic: results of spawned model calls.
enum TaskReport {
    Lab(LabEvent),
    Connection(Result<String, String>),
}

/// Owns the lab state. Every mutation happens on this loop, so spawned
/// requests only ever report back through `reports`.
pub struct Engine {
    commands: UnboundedReceiver<EngineCommand>,
    responses: UnboundedSender<EngineResponse>,
    reports_tx: UnboundedSender<TaskReport>,
    reports: UnboundedReceiver<TaskReport>,

    state: LabState,
    backend: Arc<dyn LlmBackend>,
    timing: BrewTiming,

    brew_task: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        character: Character,
        timing: BrewTiming,
    ) -> (Self, EngineHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();
        let (reports_tx, reports) = mpsc::unbounded_channel();

        let engine = Self {
            commands: cmd_rx,
            responses: resp_tx,
            reports_tx,
            reports,
            state: LabState::new(character),
            backend,
            timing,
            brew_task: None,
        };

        let handle = EngineHandle {
            commands: cmd_tx,
            responses: resp_rx,
        };

        (engine, handle)
    }

    pub fn snapshot(&self) -> LabSnapshot {
        LabSnapshot::from(&self.state)
    }

    pub async fn run(mut self) {
        tracing::info!(character = self.state.character.id, "engine started");
        self.emit(EngineResponse::Snapshot(Box::new(self.snapshot())));

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(EngineCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(report) = self.reports.recv() => self.handle_report(report),
            }
        }

        if let Some(task) = self.brew_task.take() {
            task.abort();
        }
        tracing::info!("engine stopped");
    }

    fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::SendMessage(text) => self.dispatch(LabEvent::UserMessage(text)),
            EngineCommand::AddIngredient { id } => self.dispatch(LabEvent::AddIngredient(id)),
            EngineCommand::StirPotion => self.dispatch(LabEvent::StirPotion),
            EngineCommand::EmptyCauldron => self.dispatch(LabEvent::EmptyCauldron),

            EngineCommand::ReplaceBackend(backend) => {
                tracing::info!("model backend replaced");
                self.backend = backend;
            }

            EngineCommand::TestConnection => {
                let backend = Arc::clone(&self.backend);
                let reports = self.reports_tx.clone();
                tokio::spawn(async move {
                    let status = backend.test_connection().await.map_err(|e| e.to_string());
                    let _ = reports.send(TaskReport::Connection(status));
                });
            }

            EngineCommand::Shutdown => {}
        }
    }

    fn handle_report(&mut self, report: TaskReport) {
        match report {
            TaskReport::Lab(event) => self.dispatch(event),
            TaskReport::Connection(status) => {
                match &status {
                    Ok(msg) => tracing::info!(%msg, "connection test passed"),
                    Err(err) => tracing::warn!(%err, "connection test failed"),
                }
                self.emit(EngineResponse::ConnectionStatus(status));
            }
        }
    }

    fn dispatch(&mut self, event: LabEvent) {
        let name = event.short_name();
        let tick = match event {
            LabEvent::BrewProgress(p) => Some(p),
            _ => None,
        };
        match &event {
            LabEvent::BrewSucceeded(_) => self.brew_task = None,
            LabEvent::BrewFailed(reason) => {
                tracing::debug!(%reason, "reverting cauldron to loaded");
                self.brew_task = None;
            }
            LabEvent::ChatFailed(reason) => {
                tracing::debug!(%reason, "answering with fallback reply");
            }
            _ => {}
        }

        let application = apply_event(&mut self.state, event);

        if let EventApplyOutcome::Rejected { reason } = &application.outcome {
            tracing::debug!(event = name, %reason, "event rejected");
            return;
        }

        for effect in application.effects {
            self.perform(effect);
        }

        match tick {
            Some(percent) => self.emit(EngineResponse::BrewProgress(percent)),
            None => self.emit(EngineResponse::Snapshot(Box::new(self.snapshot()))),
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Sound(cue) => self.emit(EngineResponse::Sound(cue)),

            Effect::Notify(text) => {
                tracing::info!(%text, "unlock");
                self.emit(EngineResponse::Notification(text));
            }

            Effect::RequestChat {
                history,
                system_instruction,
            } => {
                tracing::info!(turns = history.len(), score = self.state.score, "sending chat turn");
                let backend = Arc::clone(&self.backend);
                let reports = self.reports_tx.clone();
                tokio::spawn(async move {
                    let event = request_reply(backend.as_ref(), &history, &system_instruction).await;
                    let _ = reports.send(TaskReport::Lab(event));
                });
            }

            Effect::RequestBrew { ingredients } => {
                tracing::info!(count = ingredients.len(), "brew started");
                let backend = Arc::clone(&self.backend);
                let reports = self.reports_tx.clone();
                let timing = self.timing;

                self.brew_task = Some(tokio::spawn(async move {
                    let event = match brew_with_timer(backend.as_ref(), &ingredients, timing, &reports).await {
                        Ok(outcome) => {
                            tracing::info!(title = %outcome.title, "brew finished");
                            LabEvent::BrewSucceeded(outcome)
                        }
                        Err(err) => {
                            tracing::warn!(%err, "brew failed");
                            LabEvent::BrewFailed(err.to_string())
                        }
                    };
                    let _ = reports.send(TaskReport::Lab(event));
                }));
            }
        }
    }

    fn emit(&self, response: EngineResponse) {
        let _ = self.responses.send(response);
    }
}

async fn request_reply(
    backend: &dyn LlmBackend,
    history: &[Message],
    system_instruction: &str,
) -> LabEvent {
    match backend.chat(history, system_instruction).await {
        Ok(text) => LabEvent::ChatReply(text),
        Err(err) => {
            tracing::warn!(%err, "chat request failed");
            LabEvent::ChatFailed(err.to_string())
        }
    }
}

/// Runs the progress timer and the outcome request side by side and
/// finishes only when both have. A failed request drops the timer.
async fn brew_with_timer(
    backend: &dyn LlmBackend,
    ingredients: &[Ingredient],
    timing: BrewTiming,
    reports: &UnboundedSender<TaskReport>,
) -> Result<PotionOutcome, LlmError> {
    let timer = async {
        let started = Instant::now();
        let mut ticks = time::interval(timing.tick());
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticks.tick().await;
            let percent = brew_progress(started.elapsed().as_millis(), timing.duration_ms);
            let _ = reports.send(TaskReport::Lab(LabEvent::BrewProgress(percent)));
            if percent >= 100.0 {
                break;
            }
        }
        Ok::<(), LlmError>(())
    };

    let request = async {
        let prompt = PromptBuilder::brew_prompt(ingredients);
        let raw = backend
            .generate_structured(&prompt, BREW_SYSTEM_INSTRUCTION, &potion_outcome_schema())
            .await?;
        decode_potion_outcome(&raw)
    };

    let ((), outcome) = tokio::try_join!(timer, request)?;
    Ok(outcome)
}
