//! Test doubles: a scripted `ChatClient` and a local stand-in for the Gemini
//! REST API served by axum on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{ header::CONTENT_TYPE, HeaderMap, StatusCode, Uri };
use axum::response::{ IntoResponse, Response };
use axum::Router;
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::llm::chat::{ Candidate, ChatClient, ChatSession, Content, GenerateContentResponse };
use crate::llm::LlmError;

pub fn text_response(text: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content::text("model", text)),
        }],
    }
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub api_key: String,
    pub session: ChatSession,
    pub message: String,
}

type Responder = Box<dyn Fn(&str) -> Result<GenerateContentResponse, LlmError> + Send + Sync>;

pub struct ScriptedChatClient {
    respond: Responder,
    delay: Option<Duration>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

impl ScriptedChatClient {
    fn with(respond: Responder) -> Self {
        Self {
            respond,
            delay: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Arc::new(Self::with(Box::new(move |_| Ok(text_response(&text)))))
    }

    /// Replies with `echo: <message>`, sleeping `delay` first.
    pub fn echoing(delay: Option<Duration>) -> Arc<Self> {
        let mut client = Self::with(Box::new(|m| Ok(text_response(&format!("echo: {}", m)))));
        client.delay = delay;
        Arc::new(client)
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::with(Box::new(|_| Ok(GenerateContentResponse::default()))))
    }

    pub fn failing(err: impl Fn() -> LlmError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self::with(Box::new(move |_| Err(err()))))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn send_message(
        &self,
        api_key: &str,
        session: &ChatSession,
        message: &str
    ) -> Result<GenerateContentResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            session: session.clone(),
            message: message.to_string(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(message)
    }

    fn get_model(&self) -> String {
        "scripted".to_string()
    }
}

#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: JsonValue,
}

#[derive(Clone)]
pub struct FakeProvider {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeProvider {
    pub fn replying(status: StatusCode, body: JsonValue) -> Self {
        Self::replying_raw(status, &body.to_string())
    }

    pub fn replying_raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn last_request(&self) -> Option<SeenRequest> {
        self.seen.lock().await.last().cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.seen.lock().await.len()
    }
}

async fn answer(
    State(provider): State<FakeProvider>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes
) -> Response {
    let seen = SeenRequest {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&body).unwrap_or(JsonValue::Null),
    };
    provider.seen.lock().await.push(seen);
    (provider.status, [(CONTENT_TYPE, "application/json")], provider.body.clone()).into_response()
}

/// Serves `provider` and returns its base URL.
pub async fn spawn_fake_provider(provider: FakeProvider) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake provider");
    let addr = listener.local_addr().expect("fake provider addr");
    let app = Router::new().fallback(answer).with_state(provider);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}
