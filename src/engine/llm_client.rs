use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{LlmConfig, Provider};
use crate::error::LlmError;
use crate::model::message::{Message, Role};

/// The two call shapes the lab needs from a language model.
/// Both are single-shot: no streaming, no retries.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Free-form reply to a role-tagged history.
    async fn chat(&self, history: &[Message], system_instruction: &str)
        -> Result<String, LlmError>;

    /// Reply constrained to `schema`, returned as raw JSON text.
    async fn generate_structured(
        &self,
        prompt: &str,
        system_instruction: &str,
        schema: &Value,
    ) -> Result<String, LlmError>;

    async fn test_connection(&self) -> Result<String, LlmError>;
}

/* =========================
   OpenAI-compatible wire types
   ========================= */

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

pub fn openai_chat_request(
    config: &LlmConfig,
    history: &[Message],
    system_instruction: &str,
) -> ChatCompletionRequest {
    let mut messages = vec![ChatMessage {
        role: "system".into(),
        content: system_instruction.into(),
    }];

    messages.extend(history.iter().map(|m| ChatMessage {
        role: match m.role {
            Role::User => "user".into(),
            Role::Assistant => "assistant".into(),
        },
        content: m.content.clone(),
    }));

    ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        temperature: config.temperature,
        response_format: None,
    }
}

pub fn openai_structured_request(
    config: &LlmConfig,
    prompt: &str,
    system_instruction: &str,
    schema: &Value,
) -> ChatCompletionRequest {
    let mut request = openai_chat_request(config, &[Message::user(prompt)], system_instruction);
    request.response_format = Some(json!({
        "type": "json_schema",
        "json_schema": {
            "name": "potion_outcome",
            "strict": true,
            "schema": schema,
        }
    }));
    request
}

fn openai_text(resp: ChatCompletionResponse) -> Result<String, LlmError> {
    let choice = resp.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
    Ok(choice.message.content.unwrap_or_default())
}

/* =========================
   Gemini wire format
   ========================= */

pub fn gemini_chat_body(temperature: f32, history: &[Message], system_instruction: &str) -> Value {
    let contents: Vec<Value> = history
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    json!({
        "contents": contents,
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "generationConfig": { "temperature": temperature },
    })
}

pub fn gemini_structured_body(prompt: &str, system_instruction: &str, schema: &Value) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": to_gemini_schema(schema),
        },
    })
}

/// Gemini's schema dialect: upper-case type names, no `additionalProperties`.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Joins the text parts of the first candidate.
pub fn gemini_text(body: &Value) -> Result<String, LlmError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or(LlmError::EmptyResponse)?;

    Ok(parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect())
}

/* =========================
   HTTP client
   ========================= */

pub struct HttpLlmClient {
    http: Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, LlmError> {
        match (self.config.provider, self.config.api_key.as_deref()) {
            (Provider::OpenAiCompatible, Some(key)) => Ok(request.bearer_auth(key)),
            (Provider::OpenAiCompatible, None) => Ok(request),
            (Provider::Gemini, Some(key)) => Ok(request.header("x-goog-api-key", key)),
            (Provider::Gemini, None) => Err(LlmError::MissingApiKey {
                provider: Provider::Gemini.label(),
            }),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, LlmError> {
        let resp = self.authorize(request)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    async fn post_openai(&self, request: &ChatCompletionRequest) -> Result<String, LlmError> {
        let resp = self
            .send(self.http.post(self.url("chat/completions")).json(request))
            .await?;
        openai_text(resp.json::<ChatCompletionResponse>().await?)
    }

    async fn post_gemini(&self, body: &Value) -> Result<String, LlmError> {
        let path = format!("models/{}:generateContent", self.config.model);
        let resp = self.send(self.http.post(self.url(&path)).json(body)).await?;
        gemini_text(&resp.json::<Value>().await?)
    }
}

#[async_trait]
impl LlmBackend for HttpLlmClient {
    async fn chat(
        &self,
        history: &[Message],
        system_instruction: &str,
    ) -> Result<String, LlmError> {
        tracing::debug!(provider = self.config.provider.label(), turns = history.len(), "chat request");

        match self.config.provider {
            Provider::OpenAiCompatible => {
                let request = openai_chat_request(&self.config, history, system_instruction);
                self.post_openai(&request).await
            }
            Provider::Gemini => {
                let body = gemini_chat_body(self.config.temperature, history, system_instruction);
                self.post_gemini(&body).await
            }
        }
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        system_instruction: &str,
        schema: &Value,
    ) -> Result<String, LlmError> {
        tracing::debug!(provider = self.config.provider.label(), %prompt, "structured request");

        match self.config.provider {
            Provider::OpenAiCompatible => {
                let request =
                    openai_structured_request(&self.config, prompt, system_instruction, schema);
                self.post_openai(&request).await
            }
            Provider::Gemini => {
                let body = gemini_structured_body(prompt, system_instruction, schema);
                self.post_gemini(&body).await
            }
        }
    }

    async fn test_connection(&self) -> Result<String, LlmError> {
        let resp = self.send(self.http.get(self.url("models"))).await?;
        let body: Value = resp.json().await?;

        let listed = match self.config.provider {
            Provider::OpenAiCompatible => body["data"].as_array(),
            Provider::Gemini => body["models"].as_array(),
        };

        Ok(format!(
            "Connected ({} models available)",
            listed.map(|a| a.len()).unwrap_or(0)
        ))
    }
}
