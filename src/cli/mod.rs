use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the WebSocket chat server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Port for the HTTP API (proxy endpoint, stateless reply, health). Not started when unset.
    #[arg(long, env = "HTTP_PORT")]
    pub http_port: Option<u16>,

    // --- Tutor Chat Provider Args ---
    /// Base URL for the Gemini REST API used by tutoring sessions.
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the client handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model name for tutoring sessions.
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-2.5-flash")]
    pub chat_model: String,

    /// Sampling temperature for tutoring sessions. Provider default when unset.
    #[arg(long, env = "CHAT_TEMPERATURE")]
    pub chat_temperature: Option<f32>,

    /// Upper bound on generated tokens per reply. Provider default when unset.
    #[arg(long, env = "CHAT_MAX_OUTPUT_TOKENS")]
    pub chat_max_output_tokens: Option<u32>,

    /// Name of the environment variable holding the tutoring session API key.
    #[arg(long, env = "CLIENT_CREDENTIAL_NAME", default_value = "TUTOR_GEMINI_API_KEY")]
    pub client_credential_name: String,

    // --- Proxy Args ---
    /// Base URL for the Gemini REST API used by the proxy endpoint.
    #[arg(long, env = "PROXY_BASE_URL")]
    pub proxy_base_url: Option<String>,

    /// Model name for the proxy endpoint.
    #[arg(long, env = "PROXY_MODEL", default_value = "gemini-1.5-flash")]
    pub proxy_model: String,

    /// Name of the environment variable holding the proxy endpoint API key.
    #[arg(long, env = "PROXY_CREDENTIAL_NAME", default_value = "GEMINI_API_KEY")]
    pub proxy_credential_name: String,

    // --- General App Args ---
    /// Optional JSON file overriding tutor_persona, proxy_persona and greeting.
    #[arg(long, env = "PERSONAS_PATH")]
    pub personas_path: Option<String>,

    /// Transport timeout in seconds for provider calls. No timeout when unset.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}
