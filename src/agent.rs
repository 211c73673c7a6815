use std::sync::Arc;
use std::time::Duration;

use log::{ error, info, warn };
use reqwest::StatusCode;
use thiserror::Error;

use crate::cli::Args;
use crate::config::CredentialProvider;
use crate::config::persona::PersonaConfig;
use crate::llm::chat::gemini::GeminiChatClient;
use crate::llm::chat::{ ChatClient, ChatSession, Content, GenerationConfig };
use crate::llm::{ LlmConfig, LlmError };
use crate::models::chat::{ Author, Transcript };

pub const FALLBACK_REPLY: &str = "I couldn't generate a response. Please try again.";
pub const RATE_LIMITED_REPLY: &str =
    "I am currently receiving too many requests! Please wait about 60 seconds and try submitting again.";

const USER_ROLE: &str = "user";
const MODEL_ROLE: &str = "model";
const SYSTEM_ROLE: &str = "system";

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("credential {0} is not configured")]
    MissingCredential(String),
    #[error("last transcript turn is not user-authored")]
    InvalidCallerState,
    #[error("provider rate limited: {0}")]
    RateLimited(String),
    #[error("provider request failed: {description}")]
    RequestFailed {
        description: String,
        credential_name: String,
    },
    #[error("provider returned no candidate text")]
    EmptyModelOutput,
}

impl ReplyError {
    /// The text handed back to the UI in place of a model reply.
    pub fn user_message(&self) -> String {
        match self {
            ReplyError::MissingCredential(name) => {
                format!("{} is not set. Please add it to your .env file.", name)
            }
            ReplyError::InvalidCallerState | ReplyError::EmptyModelOutput => {
                FALLBACK_REPLY.to_string()
            }
            ReplyError::RateLimited(_) => RATE_LIMITED_REPLY.to_string(),
            ReplyError::RequestFailed { description, credential_name } => {
                format!(
                    "I encountered an error: {}. Please make sure {} is set in your .env file.",
                    description,
                    credential_name
                )
            }
        }
    }
}

/// True when a failure description reads as a provider rate limit / quota hit.
pub fn is_rate_limited(description: &str) -> bool {
    let lower = description.to_lowercase();
    lower.contains("429") || lower.contains("quota")
}

fn classify_failure(err: LlmError, credential_name: &str) -> ReplyError {
    let description = err.to_string();
    if err.status() == Some(StatusCode::TOO_MANY_REQUESTS) || is_rate_limited(&description) {
        ReplyError::RateLimited(description)
    } else {
        ReplyError::RequestFailed {
            description,
            credential_name: credential_name.to_string(),
        }
    }
}

fn provider_role(author: Author) -> &'static str {
    match author {
        Author::User => USER_ROLE,
        Author::Assistant => MODEL_ROLE,
    }
}

/// Every turn before the pending one, in provider roles, with any leading
/// run of model turns dropped so the history opens on a user turn.
pub fn derive_history(transcript: &Transcript) -> Vec<Content> {
    let prior = &transcript.messages()[..transcript.len().saturating_sub(1)];
    prior
        .iter()
        .map(|m| Content::text(provider_role(m.author), m.text.clone()))
        .skip_while(|c| c.role() == Some(MODEL_ROLE))
        .collect()
}

/// Turns a transcript ending in a user turn into one reply string.
#[derive(Clone)]
pub struct TutorAgent {
    chat_client: Arc<dyn ChatClient>,
    credentials: Arc<dyn CredentialProvider>,
    credential_name: String,
    persona: String,
    generation_config: Option<GenerationConfig>,
}

impl TutorAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        credentials: Arc<dyn CredentialProvider>,
        credential_name: impl Into<String>,
        persona: impl Into<String>
    ) -> Self {
        Self {
            chat_client,
            credentials,
            credential_name: credential_name.into(),
            persona: persona.into(),
            generation_config: None,
        }
    }

    pub fn with_generation_config(mut self, generation_config: Option<GenerationConfig>) -> Self {
        self.generation_config = generation_config;
        self
    }

    pub fn from_args(
        args: &Args,
        personas: &PersonaConfig,
        credentials: Arc<dyn CredentialProvider>
    ) -> Result<Self, LlmError> {
        let config = LlmConfig {
            model: Some(args.chat_model.clone()),
            base_url: args.chat_base_url.clone(),
            request_timeout: args.request_timeout_secs.map(Duration::from_secs),
        };
        let chat_client = Arc::new(GeminiChatClient::from_config(&config)?);
        info!(
            "Tutor chat client configured: Model={}, BaseURL={}",
            chat_client.get_model(),
            config.base_url_or_default()
        );

        let generation_config = GenerationConfig::from_knobs(
            args.chat_temperature,
            args.chat_max_output_tokens
        );

        Ok(
            Self::new(
                chat_client,
                credentials,
                args.client_credential_name.clone(),
                personas.tutor_persona.clone()
            ).with_generation_config(generation_config)
        )
    }

    pub fn credential_name(&self) -> &str {
        &self.credential_name
    }

    pub fn build_session(&self, transcript: &Transcript) -> ChatSession {
        let history = derive_history(transcript);
        ChatSession {
            history: if history.is_empty() { None } else { Some(history) },
            system_instruction: Content::text(SYSTEM_ROLE, self.persona.clone()),
            generation_config: self.generation_config,
        }
    }

    pub async fn try_reply(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        let api_key = self.credentials
            .get_credential(&self.credential_name)
            .ok_or_else(|| ReplyError::MissingCredential(self.credential_name.clone()))?;

        let pending = match transcript.last() {
            Some(m) if m.author == Author::User => m,
            _ => {
                return Err(ReplyError::InvalidCallerState);
            }
        };

        let session = self.build_session(transcript);
        let response = self.chat_client
            .send_message(&api_key, &session, &pending.text).await
            .map_err(|e| classify_failure(e, &self.credential_name))?;

        response.text().ok_or(ReplyError::EmptyModelOutput)
    }

    /// Never fails: every error is folded into the text the UI shows.
    pub async fn get_reply(&self, transcript: &Transcript) -> String {
        match self.try_reply(transcript).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    | ReplyError::MissingCredential(_)
                    | ReplyError::InvalidCallerState
                    | ReplyError::EmptyModelOutput => warn!("Tutor reply not generated: {}", e),
                    ReplyError::RateLimited(_) | ReplyError::RequestFailed { .. } => {
                        error!("Chat error: {}", e)
                    }
                }
                e.user_message()
            }
        }
    }
}
