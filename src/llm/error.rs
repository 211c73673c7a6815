use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Gemini API error [{status}]: {message}")]
    Api {
        status: StatusCode,
        message: String,
    },
    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid Gemini endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl LlmError {
    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
