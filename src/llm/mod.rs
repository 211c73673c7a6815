pub mod chat;
pub mod error;

use std::time::Duration;

pub use error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn base_url_or_default(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }
}

pub fn build_http_client(config: &LlmConfig) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
