mod ui;

use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,wizard_lab=debug".into()),
        )
        .with_target(false)
        .init();

    let config = wizard_lab::config::load_config();
    tracing::info!(
        provider = config.llm.provider.label(),
        model = %config.llm.model,
        "starting wizard lab"
    );

    let engine = ui::app::spawn_engine(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Wizard Lab")
            .with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wizard Lab",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::WizardLabApp::new(config, engine)))),
    )
    .map_err(|err| anyhow::anyhow!("window closed with error: {err}"))
}
