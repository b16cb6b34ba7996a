use thiserror::Error;

use crate::llm::prompt::LlmPrompt;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// The completion boundary: one prompt in, generated text out.
///
/// Every failure (transport, status, shape) is an `LlmError`; callers treat
/// all of them as "no test generated for this file".
pub trait CompletionBackend {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, LlmError>;
}
