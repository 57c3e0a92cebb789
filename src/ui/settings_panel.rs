use std::sync::Arc;

use eframe::egui;

use wizard_lab::config::{save_config, Provider};
use wizard_lab::engine::llm_client::HttpLlmClient;
use wizard_lab::engine::protocol::EngineCommand;
use wizard_lab::model::message::Role;

use super::app::WizardLabApp;
use super::settings::role_key;
use super::settings_io::save_settings;

pub fn draw_settings_window(ctx: &egui::Context, app: &mut WizardLabApp) {
    let mut open = app.ui.show_settings;
    let mut apply = false;
    let mut test = false;

    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.heading("Model");

            let llm = &mut app.ui.config.llm;
            let previous = llm.provider;
            egui::ComboBox::from_label("Provider")
                .selected_text(llm.provider.label())
                .show_ui(ui, |ui| {
                    for provider in [Provider::OpenAiCompatible, Provider::Gemini] {
                        ui.selectable_value(&mut llm.provider, provider, provider.label());
                    }
                });
            if llm.provider != previous {
                llm.base_url = llm.provider.default_base_url().into();
                llm.model = llm.provider.default_model().into();
            }

            ui.label("Endpoint");
            ui.text_edit_singleline(&mut llm.base_url);

            ui.label("Model");
            ui.text_edit_singleline(&mut llm.model);

            ui.label("API key");
            let mut key = llm.api_key.clone().unwrap_or_default();
            if ui
                .add(egui::TextEdit::singleline(&mut key).password(true))
                .changed()
            {
                llm.api_key = Some(key).filter(|k| !k.trim().is_empty());
            }

            ui.label("Temperature");
            ui.add(egui::Slider::new(&mut llm.temperature, 0.0..=2.0));

            ui.horizontal(|ui| {
                apply = ui.button("Apply & Save").clicked();
                test = ui.button("Test connection").clicked();
            });

            match &app.ui.connection_status {
                Some(Ok(msg)) => {
                    ui.colored_label(egui::Color32::LIGHT_GREEN, msg.as_str());
                }
                Some(Err(err)) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }
                None => {}
            }

            ui.separator();
            ui.heading("Display");

            ui.label("UI Scale");
            let mut changed = ui
                .add(egui::Slider::new(&mut app.ui.settings.ui_scale, 0.75..=2.0))
                .changed();

            for role in [Role::User, Role::Assistant] {
                let key = role_key(role);
                let mut color = app.ui.settings.color(key);
                ui.horizontal(|ui| {
                    ui.label(format!("{key} bubble"));
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        app.ui.settings.set_color(key, color);
                        changed = true;
                    }
                });
            }

            if changed {
                save_settings(&app.ui.settings);
            }
        });

    app.ui.show_settings = open;

    if apply {
        apply_config(app);
    }
    if test {
        app.ui.connection_status = None;
        app.send_command(EngineCommand::TestConnection);
    }
}

fn apply_config(app: &mut WizardLabApp) {
    if let Err(err) = save_config(&app.ui.config) {
        tracing::warn!(%err, "could not save config");
    }

    match HttpLlmClient::new(app.ui.config.llm.clone()) {
        Ok(client) => app.send_command(EngineCommand::ReplaceBackend(Arc::new(client))),
        Err(err) => app.ui.connection_status = Some(Err(err.to_string())),
    }
}
