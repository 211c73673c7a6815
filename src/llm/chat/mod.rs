pub mod gemini;

use async_trait::async_trait;
use log::debug;
use serde::{ Deserialize, Serialize };
use url::Url;

use super::LlmError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// `None` when no knob is set, so the field is left out of the request.
    pub fn from_knobs(temperature: Option<f32>, max_output_tokens: Option<u32>) -> Option<Self> {
        if temperature.is_none() && max_output_tokens.is_none() {
            return None;
        }
        Some(Self { temperature, max_output_tokens })
    }
}

/// A chat seeded with prior turns and a persona, ready to take one new turn.
///
/// `history` is `None` rather than empty when there is nothing to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub history: Option<Vec<Content>>,
    pub system_instruction: Content,
    pub generation_config: Option<GenerationConfig>,
}

impl ChatSession {
    pub fn request_for(&self, message: &str) -> GenerateContentRequest {
        let mut contents = self.history.clone().unwrap_or_default();
        contents.push(Content::text("user", message));
        GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: self.generation_config,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// All text parts of the first candidate, joined.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Text of the first part of the first candidate only.
    pub fn first_part_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `message` as the next user turn of `session`. One round-trip, no retries.
    async fn send_message(
        &self,
        api_key: &str,
        session: &ChatSession,
        message: &str
    ) -> Result<GenerateContentResponse, LlmError>;

    fn get_model(&self) -> String;
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

pub fn generate_content_url(base_url: &str, model: &str) -> Result<Url, LlmError> {
    let url = format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model);
    Ok(Url::parse(&url)?)
}

/// POSTs a generateContent body. Non-2xx statuses become `LlmError::Api`
/// carrying the provider's own error message when it sent one.
pub async fn post_generate_content(
    http: &reqwest::Client,
    url: Url,
    api_key: &str,
    payload: &(impl Serialize + Sync)
) -> Result<GenerateContentResponse, LlmError> {
    debug!("POST {}", url);
    let resp = http
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(payload)
        .send().await
        .map_err(|e| LlmError::Transport(e.without_url()))?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| LlmError::Transport(e.without_url()))?;

    if !status.is_success() {
        let message = serde_json
            ::from_str::<GoogleErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        return Err(LlmError::Api { status, message });
    }

    Ok(serde_json::from_str(&body)?)
}
