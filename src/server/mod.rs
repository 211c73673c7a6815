pub mod api;
pub mod proxy;
pub mod websocket;

use crate::agent::TutorAgent;
use crate::server::proxy::ProxyState;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    http_port: Option<u16>,
    agent: Arc<TutorAgent>,
    proxy_state: ProxyState,
    greeting: String,
}

impl Server {
    pub fn new(
        addr: String,
        http_port: Option<u16>,
        agent: Arc<TutorAgent>,
        proxy_state: ProxyState,
        greeting: String,
    ) -> Self {
        Self {
            addr,
            http_port,
            agent,
            proxy_state,
            greeting,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(http_port) = self.http_port {
            self.start_http_server(http_port).await?;
        }

        self.start_ws_server().await?;

        Ok(())
    }

    async fn start_http_server(&self, http_port: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(
            http_port,
            self.agent.clone(),
            self.proxy_state.clone(),
        ).await
    }

    async fn start_ws_server(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        websocket::start_ws_server(
            &self.addr,
            self.agent.clone(),
            self.greeting.clone(),
        ).await
    }
}
