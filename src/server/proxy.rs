//! `/chat-with-gemini`: a single-shot proxy to the Gemini REST API with its
//! own persona and credential, answering in `{reply}` / `{error}` JSON.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{ header, HeaderValue, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use log::{ error, info, warn };
use serde::Serialize;
use thiserror::Error;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::agent::FALLBACK_REPLY;
use crate::cli::Args;
use crate::config::CredentialProvider;
use crate::config::persona::PersonaConfig;
use crate::llm::chat::{ generate_content_url, post_generate_content };
use crate::llm::{ build_http_client, LlmConfig, LlmError };
use crate::models::proxy::{ ProxyRequest, ProxyResponse };

pub const PROXY_ROUTE: &str = "/chat-with-gemini";
pub const DEFAULT_PROXY_MODEL: &str = "gemini-1.5-flash";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Client-Info, Apikey";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Message is required")]
    MissingMessage,
    #[error("{0} is not configured")]
    MissingCredential(String),
    #[error("Gemini API error: {}", .0.as_u16())]
    Upstream(StatusCode),
    #[error("Server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingMessage => StatusCode::BAD_REQUEST,
            ProxyError::MissingCredential(_) | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream(status) => *status,
        }
    }
}

impl From<LlmError> for ProxyError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, .. } => ProxyError::Upstream(status),
            other => ProxyError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ProxyResponse::Error { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct RawPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct RawContent<'a> {
    parts: Vec<RawPart<'a>>,
}

#[derive(Serialize)]
struct RawGenerateRequest<'a> {
    system_instruction: RawContent<'a>,
    contents: Vec<RawContent<'a>>,
}

#[derive(Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    credential_name: String,
    base_url: String,
    model: String,
    persona: String,
}

impl ProxyState {
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        credential_name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        persona: impl Into<String>
    ) -> Self {
        Self {
            http,
            credentials,
            credential_name: credential_name.into(),
            base_url: base_url.into(),
            model: model.into(),
            persona: persona.into(),
        }
    }

    pub fn from_args(
        args: &Args,
        personas: &PersonaConfig,
        credentials: Arc<dyn CredentialProvider>
    ) -> Result<Self, LlmError> {
        let config = LlmConfig {
            model: Some(args.proxy_model.clone()),
            base_url: args.proxy_base_url.clone(),
            request_timeout: args.request_timeout_secs.map(Duration::from_secs),
        };
        let http = build_http_client(&config)?;
        info!(
            "Proxy configured: Model={}, BaseURL={}, Credential={}",
            args.proxy_model,
            config.base_url_or_default(),
            args.proxy_credential_name
        );
        Ok(
            Self::new(
                http,
                credentials,
                args.proxy_credential_name.clone(),
                config.base_url_or_default(),
                args.proxy_model.clone(),
                personas.proxy_persona.clone()
            )
        )
    }

    async fn generate(&self, api_key: &str, message: &str) -> Result<String, ProxyError> {
        let payload = RawGenerateRequest {
            system_instruction: RawContent {
                parts: vec![RawPart { text: &self.persona }],
            },
            contents: vec![RawContent {
                parts: vec![RawPart { text: message }],
            }],
        };
        let url = generate_content_url(&self.base_url, &self.model)?;
        let response = post_generate_content(&self.http, url, api_key, &payload).await?;
        Ok(response.first_part_text().unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(PROXY_ROUTE, post(chat_with_gemini).options(preflight))
        .layer(
            SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static(ALLOW_ORIGIN)
            )
        )
        .layer(
            SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOW_METHODS)
            )
        )
        .layer(
            SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOW_HEADERS)
            )
        )
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn chat_with_gemini(
    State(state): State<ProxyState>,
    body: Bytes
) -> Result<Json<ProxyResponse>, ProxyError> {
    let request: ProxyRequest = serde_json
        ::from_slice(&body)
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    let message = request.message
        .filter(|m| !m.is_empty())
        .ok_or(ProxyError::MissingMessage)?;

    let api_key = state.credentials.get_credential(&state.credential_name).ok_or_else(|| {
        warn!("Proxy credential {} is not configured", state.credential_name);
        ProxyError::MissingCredential(state.credential_name.clone())
    })?;

    match state.generate(&api_key, &message).await {
        Ok(reply) => Ok(Json(ProxyResponse::Reply { reply })),
        Err(e) => {
            error!("Proxy request failed: {}", e);
            Err(e)
        }
    }
}
