pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod session;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;

use agent::TutorAgent;
use cli::Args;
use config::persona::resolve_personas;
use config::{ CredentialProvider, EnvCredentials };
use log::{ info, warn };
use server::proxy::ProxyState;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("HTTP Port: {:?}", args.http_port);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("client default"));
    info!("Chat Temperature: {:?}", args.chat_temperature);
    info!("Chat Max Output Tokens: {:?}", args.chat_max_output_tokens);
    info!("Client Credential: {}", args.client_credential_name);
    info!("Proxy Model: {}", args.proxy_model);
    info!("Proxy Credential: {}", args.proxy_credential_name);
    info!("Personas Path: {}", args.personas_path.as_deref().unwrap_or("built-in"));
    info!("Request Timeout (s): {:?}", args.request_timeout_secs);
    info!("-------------------------");

    let credentials: Arc<dyn CredentialProvider> = Arc::new(EnvCredentials);
    for name in [&args.client_credential_name, &args.proxy_credential_name] {
        if credentials.get_credential(name).is_none() {
            warn!("{} is not set; requests needing it will get a configuration message", name);
        }
    }

    let personas = resolve_personas(args.personas_path.as_deref())?;
    let agent = Arc::new(TutorAgent::from_args(&args, &personas, credentials.clone())?);
    let proxy_state = ProxyState::from_args(&args, &personas, credentials)?;

    info!("Starting server on: {}", args.server_addr);
    let server = Server::new(
        args.server_addr.clone(),
        args.http_port,
        agent,
        proxy_state,
        personas.greeting.clone(),
    );
    server.run().await?;

    Ok(())
}
