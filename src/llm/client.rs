// src/llm/client.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::llm::backend::{CompletionBackend, LlmError};
use crate::llm::prompt::LlmPrompt;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Blocking chat-completions client.
pub struct LlmClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(cfg: &GeneratorConfig) -> Result<Self, LlmError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a LlmPrompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        }
    }
}

impl CompletionBackend for LlmClient {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, LlmError> {
        let body = self.request_body(prompt);

        debug!(endpoint = %self.endpoint, model = %self.model, "sending completion request");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text()?;
        parse_response(&text)
    }
}

/// A 2xx body that is not JSON is a provider fault, not a transport one.
fn parse_response(text: &str) -> Result<String, LlmError> {
    let json: Value = serde_json::from_str(text)
        .map_err(|e| LlmError::Malformed(format!("response is not JSON: {e}")))?;
    extract_text(json)
}

/// Generated text lives at `/choices/0/message/content`.
fn extract_text(json: Value) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_value(json).map_err(|e| LlmError::Malformed(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::Malformed("missing choices[0].message.content".into()))
}
