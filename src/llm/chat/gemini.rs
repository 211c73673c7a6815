use async_trait::async_trait;
use log::info;

use super::{ post_generate_content, generate_content_url, ChatClient, ChatSession, GenerateContentResponse };
use crate::llm::{ build_http_client, LlmConfig, LlmError };

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiChatClient {
    http: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(http: reqwest::Client, model: Option<String>, base_url: String) -> Self {
        let chat_model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        Self {
            http,
            model: chat_model,
            base_url,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = build_http_client(config)?;
        Ok(Self::new(http, config.model.clone(), config.base_url_or_default().to_string()))
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn send_message(
        &self,
        api_key: &str,
        session: &ChatSession,
        message: &str
    ) -> Result<GenerateContentResponse, LlmError> {
        info!(
            "GeminiChatClient::send_message() → model={} history_len={}",
            self.model,
            session.history.as_ref().map_or(0, Vec::len)
        );
        let url = generate_content_url(&self.base_url, &self.model)?;
        let payload = session.request_for(message);
        post_generate_content(&self.http, url, api_key, &payload).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::Content;
    use crate::test_support::{ spawn_fake_provider, FakeProvider };
    use reqwest::StatusCode;
    use serde_json::json;

    fn session() -> ChatSession {
        ChatSession {
            history: None,
            system_instruction: Content::text("system", "persona"),
            generation_config: None,
        }
    }

    #[tokio::test]
    async fn posts_session_to_model_endpoint() {
        let provider = FakeProvider::replying(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "Think about nested loops."}]}}]})
        );
        let base_url = spawn_fake_provider(provider.clone()).await;
        let client = GeminiChatClient::new(reqwest::Client::new(), None, base_url);

        let resp = client.send_message("k-123", &session(), "What is Big-O?").await.unwrap();
        assert_eq!(resp.text().as_deref(), Some("Think about nested loops."));

        let seen = provider.last_request().await.unwrap();
        assert_eq!(seen.path, "/models/gemini-2.5-flash:generateContent");
        assert_eq!(seen.api_key.as_deref(), Some("k-123"));
        assert_eq!(seen.body["contents"], json!([{"role": "user", "parts": [{"text": "What is Big-O?"}]}]));
        assert_eq!(seen.body["systemInstruction"]["parts"][0]["text"], "persona");
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let provider = FakeProvider::replying(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}})
        );
        let base_url = spawn_fake_provider(provider).await;
        let client = GeminiChatClient::new(reqwest::Client::new(), Some("gemini-pro".into()), base_url);

        let err = client.send_message("k", &session(), "hi").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(err.to_string().contains("check quota"));
        assert_eq!(client.get_model(), "gemini-pro");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let provider = FakeProvider::replying_raw(StatusCode::OK, "not json");
        let base_url = spawn_fake_provider(provider).await;
        let client = GeminiChatClient::new(reqwest::Client::new(), None, base_url);

        let err = client.send_message("k", &session(), "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }
}
