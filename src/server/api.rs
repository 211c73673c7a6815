use crate::agent::TutorAgent;
use crate::models::chat::Transcript;
use crate::server::proxy::{ self, ProxyState };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::State,
    response::IntoResponse,
    Json,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub transcript: Transcript,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReplyResponse {
    pub reply: String,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<TutorAgent>,
}

pub fn router(agent: Arc<TutorAgent>, proxy_state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/reply", post(reply_handler))
        .layer(cors)
        .with_state(AppState { agent })
        .merge(proxy::router(proxy_state))
}

pub async fn start_http_server(
    http_port: u16,
    agent: Arc<TutorAgent>,
    proxy_state: ProxyState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(agent, proxy_state);

    tokio::spawn(async move {
        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                    error!("HTTP server error: {}", e);
                }
            },
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            }
        }
    });

    info!("HTTP server started");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "algomentor",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The UI owns the transcript; this answers its last user turn.
async fn reply_handler(
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> Json<ReplyResponse> {
    let reply = state.agent.get_reply(&req.transcript).await;
    Json(ReplyResponse { reply })
}
