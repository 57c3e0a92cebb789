use std::f32::consts::TAU;

use eframe::egui;

use wizard_lab::engine::protocol::EngineCommand;
use wizard_lab::model::ingredient::Ingredient;
use wizard_lab::model::potion::BrewPhase;

use super::app::{hex_to_color32, WizardLabApp};

const SHELF_COLUMNS: usize = 4;

pub fn draw_lab_panel(ui: &mut egui::Ui, app: &mut WizardLabApp) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                section_heading(ui, "INGREDIENT SHELF");
            });
            draw_shelf(ui, app);

            ui.add_space(16.0);
            ui.vertical_centered(|ui| {
                draw_cauldron(ui, app);
                ui.add_space(12.0);
                draw_controls(ui, app);
            });

            ui.add_space(16.0);
            ui.separator();
            ui.vertical_centered(|ui| {
                section_heading(ui, "MASTERED RECIPES");
            });
            draw_mastered(ui, app);
        });
}

fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.label(
        egui::RichText::new(text)
            .small()
            .color(egui::Color32::from_rgba_unmultiplied(253, 230, 138, 128)),
    );
}

/* =========================
   Shelf
   ========================= */

fn draw_shelf(ui: &mut egui::Ui, app: &mut WizardLabApp) {
    let enabled = app.ui.snapshot.can_add_ingredient();
    let mut picked: Option<&'static str> = None;

    egui::Grid::new("ingredient_shelf")
        .num_columns(SHELF_COLUMNS)
        .spacing([6.0, 6.0])
        .show(ui, |ui| {
            for (i, ing) in app.ui.snapshot.available_ingredients.iter().enumerate() {
                if shelf_button(ui, ing, enabled).clicked() {
                    picked = Some(ing.id);
                }
                if (i + 1) % SHELF_COLUMNS == 0 {
                    ui.end_row();
                }
            }
        });

    if let Some(id) = picked {
        app.send_command(EngineCommand::AddIngredient { id: id.to_string() });
    }
}

fn shelf_button(ui: &mut egui::Ui, ing: &Ingredient, enabled: bool) -> egui::Response {
    let label = format!("{}\n{}", ing.icon, ing.name);
    let button = egui::Button::new(egui::RichText::new(label).size(11.0))
        .min_size(egui::vec2(96.0, 56.0))
        .stroke(egui::Stroke::new(1.0, hex_to_color32(ing.color).gamma_multiply(0.5)));

    ui.add_enabled(enabled, button).on_hover_ui(|ui| {
        ui.label(egui::RichText::new(ing.name).strong());
        ui.label(egui::RichText::new(ing.description).italics());
    })
}

/* =========================
   Cauldron
   ========================= */

fn draw_cauldron(ui: &mut egui::Ui, app: &WizardLabApp) {
    let snapshot = &app.ui.snapshot;
    let potion = &snapshot.potion;
    let progress = app.ui.brew_progress;

    let size = 220.0;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter_at(rect.expand(24.0));
    let center = rect.center();
    let radius = size * 0.5 - 8.0;

    painter.circle_filled(center, radius + 6.0, egui::Color32::from_rgb(30, 41, 59));

    let alpha = if potion.ingredients.is_empty() { 0.05 } else { 0.75 };
    let swell = if potion.is_stirring { 1.0 + progress / 500.0 } else { 1.0 };
    let liquid = hex_to_color32(potion.liquid_color()).gamma_multiply(alpha);
    painter.circle_filled(center, (radius - 4.0) * swell.min(1.1), liquid);

    if potion.is_stirring {
        draw_progress_ring(&painter, center, radius + 12.0, progress);
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "🪄",
            egui::FontId::proportional(36.0),
            egui::Color32::WHITE,
        );
    }

    if let (true, Some(result)) = (potion.is_complete, potion.result.as_ref()) {
        painter.circle_stroke(
            center,
            radius + 6.0,
            egui::Stroke::new(4.0, egui::Color32::from_rgba_unmultiplied(251, 191, 36, 80)),
        );

        let sparkle_color = hex_to_color32(&result.color);
        for offset in &app.ui.sparkles {
            let pos = rect.min - egui::vec2(20.0, 20.0) + *offset * (size + 40.0);
            painter.text(
                pos,
                egui::Align2::CENTER_CENTER,
                "✨",
                egui::FontId::proportional(18.0),
                sparkle_color,
            );
        }

        let text_color = egui::Color32::from_rgb(15, 23, 42);
        painter.text(
            center - egui::vec2(0.0, 18.0),
            egui::Align2::CENTER_CENTER,
            &result.title,
            egui::FontId::proportional(18.0),
            text_color,
        );

        let galley = painter.layout(
            result.description.clone(),
            egui::FontId::proportional(12.0),
            text_color,
            radius * 1.4,
        );
        let top_left = egui::pos2(center.x - galley.size().x * 0.5, center.y);
        painter.galley(top_left, galley, text_color);
    }
}

fn draw_progress_ring(painter: &egui::Painter, center: egui::Pos2, radius: f32, percent: f32) {
    let sweep = TAU * (percent / 100.0).clamp(0.0, 1.0);
    let steps = 64;

    let points: Vec<egui::Pos2> = (0..=steps)
        .map(|i| {
            // Start at twelve o'clock
            let angle = -TAU / 4.0 + sweep * i as f32 / steps as f32;
            center + egui::vec2(angle.cos(), angle.sin()) * radius
        })
        .collect();

    painter.add(egui::Shape::line(
        points,
        egui::Stroke::new(4.0, egui::Color32::from_rgb(168, 85, 247)),
    ));
}

/* =========================
   Controls
   ========================= */

fn draw_controls(ui: &mut egui::Ui, app: &mut WizardLabApp) {
    let snapshot = &app.ui.snapshot;

    let label = match snapshot.potion.phase() {
        BrewPhase::Brewing => format!("BREWING {}%", app.ui.brew_progress.round() as u32),
        BrewPhase::Complete => "POTION READY".to_string(),
        BrewPhase::Idle | BrewPhase::Loaded => "STIR POTION".to_string(),
    };

    let fill = if snapshot.potion.is_complete {
        egui::Color32::from_rgb(245, 158, 11)
    } else {
        egui::Color32::from_rgb(180, 83, 9)
    };

    let stir = ui.add_enabled(
        snapshot.can_stir(),
        egui::Button::new(egui::RichText::new(label).color(egui::Color32::WHITE))
            .fill(fill)
            .min_size(egui::vec2(220.0, 32.0)),
    );

    let show_empty = snapshot.potion.is_complete;
    let icons: String = snapshot.potion.ingredients.iter().map(|i| i.icon).collect::<Vec<_>>().join(" ");

    let mut empty = false;
    if show_empty {
        empty = ui.small_button("EMPTY CAULDRON").clicked();
    }

    ui.label(egui::RichText::new(icons).size(20.0));

    if stir.clicked() {
        app.send_command(EngineCommand::StirPotion);
    }
    if empty {
        app.send_command(EngineCommand::EmptyCauldron);
    }
}

/* =========================
   Mastered
   ========================= */

fn draw_mastered(ui: &mut egui::Ui, app: &WizardLabApp) {
    let mastered = &app.ui.snapshot.mastered;

    if mastered.is_empty() {
        ui.vertical_centered(|ui| {
            ui.weak(egui::RichText::new("No unique potions brewed yet...").italics());
        });
        return;
    }

    ui.horizontal_wrapped(|ui| {
        for potion in mastered {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(15, 23, 42))
                .corner_radius(egui::CornerRadius::same(10))
                .inner_margin(egui::Margin::symmetric(8, 4))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("●").color(hex_to_color32(&potion.color)));
                        ui.label(egui::RichText::new(&potion.title).small());
                    });
                });
        }
    });
}
