pub mod app;
pub mod chat_panel;
pub mod lab_panel;
pub mod settings;
pub mod settings_io;
pub mod settings_panel;
