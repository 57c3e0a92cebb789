use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use eframe::egui;
use rand::Rng;

use wizard_lab::config::AppConfig;
use wizard_lab::engine::engine::{Engine, EngineHandle};
use wizard_lab::engine::llm_client::HttpLlmClient;
use wizard_lab::engine::protocol::{EngineCommand, EngineResponse};
use wizard_lab::model::character::Character;
use wizard_lab::model::lab_state::LabSnapshot;

use crate::ui::chat_panel::draw_chat_panel;
use crate::ui::lab_panel::draw_lab_panel;
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::load_settings;
use crate::ui::settings_panel::draw_settings_window;

/// How long an unlock toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Below this width the two halves become tabs.
const NARROW_WIDTH: f32 = 760.0;

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabTab {
    #[default]
    Scriptorium,
    Laboratory,
}

/* =========================
   UI State
   ========================= */

pub struct UiState {
    pub input_text: String,
    pub snapshot: LabSnapshot,
    pub brew_progress: f32,
    pub notification: Option<(String, Instant)>,

    pub active_tab: LabTab,
    pub should_auto_scroll: bool,
    pub show_settings: bool,

    pub config: AppConfig,
    pub connection_status: Option<Result<String, String>>,
    pub settings: UiSettings,

    /// Unit-square offsets for the completion sparkles
    pub sparkles: Vec<egui::Vec2>,
}

/* =========================
   App
   ========================= */

pub struct WizardLabApp {
    pub ui: UiState,
    engine: EngineHandle,
}

/// Starts the engine on its own thread with a single-threaded runtime.
pub fn spawn_engine(config: &AppConfig) -> anyhow::Result<EngineHandle> {
    let backend = HttpLlmClient::new(config.llm.clone()).context("building model client")?;
    let (engine, handle) = Engine::new(Arc::new(backend), Character::default(), config.brew);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting engine runtime")?;

    std::thread::Builder::new()
        .name("lab-engine".into())
        .spawn(move || runtime.block_on(engine.run()))
        .context("spawning engine thread")?;

    Ok(handle)
}

impl WizardLabApp {
    pub fn new(config: AppConfig, engine: EngineHandle) -> Self {
        let settings = load_settings();

        Self {
            ui: UiState {
                input_text: String::new(),
                snapshot: LabSnapshot::default(),
                brew_progress: 0.0,
                notification: None,
                active_tab: LabTab::default(),
                should_auto_scroll: true,
                show_settings: false,
                config,
                connection_status: None,
                settings,
                sparkles: Vec::new(),
            },
            engine,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.engine.commands.send(cmd).is_err() {
            tracing::error!("engine is gone; command dropped");
        }
    }

    fn pump_responses(&mut self) {
        while let Ok(resp) = self.engine.responses.try_recv() {
            match resp {
                EngineResponse::Snapshot(snapshot) => {
                    if snapshot.messages.len() != self.ui.snapshot.messages.len()
                        || snapshot.is_typing != self.ui.snapshot.is_typing
                    {
                        self.ui.should_auto_scroll = true;
                    }
                    if snapshot.potion.is_complete && !self.ui.snapshot.potion.is_complete {
                        self.ui.sparkles = scatter_sparkles(8);
                    }
                    self.ui.brew_progress = snapshot.brew_progress;
                    self.ui.snapshot = *snapshot;
                }
                EngineResponse::BrewProgress(percent) => {
                    self.ui.brew_progress = percent;
                }
                EngineResponse::Notification(text) => {
                    self.ui.notification = Some((text, Instant::now()));
                }
                EngineResponse::Sound(cue) => {
                    tracing::debug!(?cue, "sound cue");
                }
                EngineResponse::ConnectionStatus(status) => {
                    self.ui.connection_status = Some(status);
                }
            }
        }
    }
}

impl Drop for WizardLabApp {
    fn drop(&mut self) {
        let _ = self.engine.commands.send(EngineCommand::Shutdown);
    }
}

fn scatter_sparkles(count: usize) -> Vec<egui::Vec2> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| egui::vec2(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect()
}

/* =========================
   egui App
   ========================= */

impl eframe::App for WizardLabApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        self.pump_responses();

        let expired = self
            .ui
            .notification
            .as_ref()
            .is_some_and(|(_, shown_at)| shown_at.elapsed() >= NOTIFICATION_TTL);
        if expired {
            self.ui.notification = None;
        }

        draw_header(ctx, &mut self.ui);
        draw_notification(ctx, &self.ui);

        let narrow = ctx.screen_rect().width() < NARROW_WIDTH;
        if narrow {
            egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.ui.active_tab, LabTab::Scriptorium, "SCRIPTORIUM");
                    ui.selectable_value(&mut self.ui.active_tab, LabTab::Laboratory, "LABORATORY");
                });
            });

            match self.ui.active_tab {
                LabTab::Scriptorium => draw_chat_panel(ctx, self),
                LabTab::Laboratory => {
                    egui::CentralPanel::default().show(ctx, |ui| draw_lab_panel(ui, self));
                }
            }
        } else {
            egui::SidePanel::right("laboratory")
                .resizable(true)
                .default_width(460.0)
                .min_width(340.0)
                .show(ctx, |ui| draw_lab_panel(ui, self));

            draw_chat_panel(ctx, self);
        }

        if self.ui.show_settings {
            draw_settings_window(ctx, self);
        }

        let busy = self.ui.snapshot.potion.is_stirring || self.ui.snapshot.is_typing;
        ctx.request_repaint_after(if busy {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(200)
        });
    }
}

/* =========================
   Header
   ========================= */

fn draw_header(ctx: &egui::Context, state: &mut UiState) {
    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(
                egui::RichText::new("Wizard Lab").color(egui::Color32::from_rgb(253, 230, 138)),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⚙").on_hover_text("Settings").clicked() {
                    state.show_settings = !state.show_settings;
                }

                let score = state.snapshot.score;
                let (icon, fill) = if state.snapshot.is_score_negative() {
                    ("⚠", egui::Color32::from_rgb(127, 29, 29))
                } else {
                    ("🏆", egui::Color32::from_black_alpha(120))
                };

                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(egui::CornerRadius::same(12))
                    .inner_margin(egui::Margin::symmetric(10, 4))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(format!("{icon} {score}"))
                                .strong()
                                .color(egui::Color32::from_rgb(254, 243, 199)),
                        );
                    });
            });
        });
    });
}

fn draw_notification(ctx: &egui::Context, state: &UiState) {
    let Some((text, _)) = &state.notification else {
        return;
    };

    egui::Area::new(egui::Id::new("unlock_toast"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 48.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(217, 119, 6))
                .corner_radius(egui::CornerRadius::same(8))
                .inner_margin(egui::Margin::symmetric(16, 8))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(text).strong().color(egui::Color32::WHITE));
                });
        });
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.85);
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}

pub fn hex_to_color32(hex: &str) -> egui::Color32 {
    wizard_lab::model::ingredient::parse_hex_color(hex)
        .map(|[r, g, b]| egui::Color32::from_rgb(r, g, b))
        .unwrap_or(egui::Color32::from_rgb(251, 191, 36))
}
