use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "wizard_lab";

/* =========================
   LLM Provider
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// `/chat/completions` style servers (LM Studio, llama.cpp, OpenAI)
    #[default]
    OpenAiCompatible,
    Gemini,
}

impl Provider {
    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAiCompatible => "OpenAI-compatible",
            Provider::Gemini => "Gemini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAiCompatible => "http://localhost:1234/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAiCompatible => "local-model",
            Provider::Gemini => "gemini-3-flash-preview",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            base_url: provider.default_base_url().into(),
            model: provider.default_model().into(),
            api_key: None,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Environment wins over the file so keys need not be written to disk.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = env_value("WIZARD_LAB_API_KEY").or_else(|| env_value("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = env_value("WIZARD_LAB_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = env_value("WIZARD_LAB_MODEL") {
            self.model = model;
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/* =========================
   Brew Timing
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewTiming {
    pub duration_ms: u64,
    pub tick_ms: u64,
}

impl Default for BrewTiming {
    fn default() -> Self {
        Self {
            duration_ms: 2500,
            tick_ms: 50,
        }
    }
}

impl BrewTiming {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/* =========================
   App Config
   ========================= */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub brew: BrewTiming,
}

pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Loads the config file, falling back to defaults when it is missing or broken.
pub fn load_config() -> AppConfig {
    let path = config_path();
    let mut config = match fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    };

    config.llm.apply_env_overrides();
    config
}

pub fn save_config(config: &AppConfig) -> anyhow::Result<()> {
    let dir = config_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = config_path();
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), "saved config");
    Ok(())
}
