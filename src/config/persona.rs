use serde::Deserialize;
use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

pub const DEFAULT_GREETING: &str =
    "Hello! I'm your Java and DSA tutor. I'm here to help you learn and improve your coding skills. Feel free to ask me questions about data structures, algorithms, or submit your code for review!";

pub const DEFAULT_TUTOR_PERSONA: &str =
    "You are an expert, supportive Java and Data Structures & Algorithms (DSA) tutor. Your primary goal is to guide the user using the Socratic method, asking probing questions to help them find the answer themselves. HOWEVER, you must obey this strict exception: If the user explicitly states they do not know the answer, asks for a tutorial, asks for basic details, or says they are stuck, you MUST stop asking questions. Instead, provide a clear, concise explanation of the concept with short code examples. After explaining, ask a single follow-up question to check their understanding. Keep answers under 800 tokens and highly logical.";

pub const DEFAULT_PROXY_PERSONA: &str =
    "You are AlgoMentor, an expert Java and Data Structures tutor. When a user submits code or asks a question, NEVER give them the direct answer or write the final code for them. Instead, analyze their Java code for Time and Space complexity (e.g., O(n), O(n²), etc.), point out any bottlenecks, give them a conceptual hint, and ask a leading question so they can figure out the optimization themselves. Keep responses concise and focused on learning.";

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Persona file IO error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Persona JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Persona '{0}' is empty")]
    Empty(&'static str),
}

/// Texts that shape the model per deployment: the tutor persona for the
/// session adapter, the narrower persona for the proxy endpoint, and the
/// greeting every transcript is seeded with.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PersonaConfig {
    pub tutor_persona: String,
    pub proxy_persona: String,
    pub greeting: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            tutor_persona: DEFAULT_TUTOR_PERSONA.to_string(),
            proxy_persona: DEFAULT_PROXY_PERSONA.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl PersonaConfig {
    fn validate(&self) -> Result<(), PersonaError> {
        if self.tutor_persona.trim().is_empty() {
            return Err(PersonaError::Empty("tutor_persona"));
        }
        if self.proxy_persona.trim().is_empty() {
            return Err(PersonaError::Empty("proxy_persona"));
        }
        if self.greeting.trim().is_empty() {
            return Err(PersonaError::Empty("greeting"));
        }
        Ok(())
    }
}

pub fn load_personas_from_str(path: &str, json: &str) -> Result<PersonaConfig, PersonaError> {
    let config: PersonaConfig = serde_json::from_str(json).map_err(|source| PersonaError::Json {
        path: path.to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_personas<P: AsRef<Path>>(path: P) -> Result<PersonaConfig, PersonaError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| PersonaError::Io {
        path: display.clone(),
        source,
    })?;
    let config = load_personas_from_str(&display, &content)?;
    info!("Loaded personas from {}", display);
    Ok(config)
}

/// Built-in defaults unless a persona file is configured.
pub fn resolve_personas(path: Option<&str>) -> Result<PersonaConfig, PersonaError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_personas(p),
        _ => {
            info!("No persona file configured, using built-in personas");
            Ok(PersonaConfig::default())
        }
    }
}
