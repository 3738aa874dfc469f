//! OpenAI REST client for chat completions and image generation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{ImageGenerator, ProviderError, TextGenerator};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Connection settings for [`OpenAiClient`].
#[derive(Clone)]
pub struct OpenAiSettings {
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    /// Model used for `/chat/completions`.
    pub chat_model: String,
    /// Model used for `/images/generations`.
    pub image_model: String,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(http: Client, mut settings: OpenAiSettings) -> Self {
        settings.api_base = settings.api_base.trim().trim_end_matches('/').to_string();
        if settings.api_base.is_empty() {
            settings.api_base = DEFAULT_API_BASE.to_string();
        }
        Self { http, settings }
    }

    async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("body is not JSON: {e}")))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        message: &str,
    ) -> Result<String, ProviderError> {
        let endpoint = format!("{}/chat/completions", self.settings.api_base);
        let payload = json!({
            "model": self.settings.chat_model,
            "messages": chat_messages(system_prompt, message),
        });
        debug!(model = %self.settings.chat_model, prompt_len = message.len(), "chat completion request");

        let body = self.post_json(&endpoint, &payload).await?;
        extract_completion_text(&body)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, size: &str, n: u32) -> Result<String, ProviderError> {
        let endpoint = format!("{}/images/generations", self.settings.api_base);
        let payload = json!({
            "model": self.settings.image_model,
            "prompt": prompt,
            "n": n.max(1),
            "size": size,
        });
        debug!(model = %self.settings.image_model, size, "image generation request");

        let body = self.post_json(&endpoint, &payload).await?;
        extract_image_url(&body)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn chat_messages(system_prompt: Option<&str>, message: &str) -> Vec<Value> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": message }));
    messages
}

fn extract_completion_text(body: &Value) -> Result<String, ProviderError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::invalid_response("completion has no choices[0].message.content"))
}

fn extract_image_url(body: &Value) -> Result<String, ProviderError> {
    body.pointer("/data/0/url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::invalid_response("image response has no data[0].url"))
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
