use thiserror::Error;

/// Failures of a single language-model call. None of these are fatal;
/// the triggering action reports them and the lab carries on.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("potion outcome is not valid JSON: {0}")]
    MalformedOutcome(#[source] serde_json::Error),

    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },
}
