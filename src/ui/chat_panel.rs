use eframe::egui;
use egui::Layout;

use wizard_lab::engine::protocol::EngineCommand;
use wizard_lab::model::message::{Message, Role};

use super::app::{bubble, WizardLabApp};

pub fn draw_chat_panel(ctx: &egui::Context, app: &mut WizardLabApp) {
    let input_id = egui::Id::new("chat_input_box");

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;
        let waiting = app.ui.snapshot.is_typing;

        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 70.0, 28.0],
                egui::TextEdit::singleline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("Message or 'Quiz me'..."),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            if ui.add_enabled(!waiting, egui::Button::new("SEND")).clicked() {
                send_now = true;
            }
        });

        if send_now && !waiting {
            let text = app.ui.input_text.clone();

            if !text.trim().is_empty() {
                app.send_command(EngineCommand::SendMessage(text));
                app.ui.input_text.clear();
            }

            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Transcript ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.snapshot.messages {
                    draw_message(ui, app, msg);
                }

                if app.ui.snapshot.is_typing {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.weak("the spirit is writing…");
                    });
                }
            });
    });

    app.ui.should_auto_scroll = false;
}

fn draw_message(ui: &mut egui::Ui, app: &WizardLabApp, msg: &Message) {
    let color = app.ui.settings.role_color(msg.role);

    ui.add_space(6.0);

    match msg.role {
        Role::User => {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, color, &msg.content);
            });
        }
        Role::Assistant => bubble(ui, color, &msg.content),
    }
}
