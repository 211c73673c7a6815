use crate::agent::TutorAgent;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::session::TutorSession;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use futures::{ Sink, SinkExt, StreamExt };
use log::{ info, warn, error };
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::net::TcpListener;
use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;

const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

pub async fn start_ws_server(
    addr: &str,
    agent: Arc<TutorAgent>,
    greeting: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("WS server listening on: {}", addr);
    serve(listener, agent, greeting).await
}

pub async fn serve(
    listener: TcpListener,
    agent: Arc<TutorAgent>,
    greeting: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Incoming connection from: {}", peer);

        let session = TutorSession::new(Arc::clone(&agent), &greeting);
        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(ws) => handle_connection(peer, ws, session).await,
                Err(e) => error!("Handshake failed for {}: {}", peer, e),
            }
        });
    }
}

async fn send_frame<S>(tx: &mut S, peer: SocketAddr, frame: &ServerMessage) -> bool
    where S: Sink<Message, Error = WsError> + Unpin
{
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize frame for {}: {}", peer, e);
            return false;
        }
    };
    match tx.send(Message::Text(json)).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error sending message to {}: {}", peer, e);
            false
        }
    }
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    session: TutorSession,
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    info!("New WebSocket connection: {}", peer);
    let (mut tx, mut rx) = websocket.split();

    let opening = ServerMessage::Transcript {
        messages: session.transcript().await.messages().to_vec(),
    };
    if !send_frame(&mut tx, peer, &opening).await {
        return;
    }

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(WsError::ConnectionClosed | WsError::Protocol(_) | WsError::Utf8) => {
                info!("WebSocket connection closed or protocol error for {}", peer);
                break;
            }
            Err(e) => {
                error!("Error receiving message from {}: {}", peer, e);
                break;
            }
        };

        if message.len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message from {} exceeds size limit ({} > {})",
                peer,
                message.len(),
                MAX_MESSAGE_SIZE
            );
            let error_msg = ServerMessage::Error {
                message: "Message too large".to_string(),
            };
            send_frame(&mut tx, peer, &error_msg).await;
            break;
        }

        match message {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Chat { content }) => {
                        if content.trim().is_empty() {
                            warn!("Ignoring blank chat message from {}", peer);
                            continue;
                        }
                        if !send_frame(&mut tx, peer, &ServerMessage::Processing).await {
                            break;
                        }
                        session.send_message(&content).await
                    }
                    Ok(ClientMessage::SubmitCode { code, topic }) => {
                        if !send_frame(&mut tx, peer, &ServerMessage::Processing).await {
                            break;
                        }
                        Some(session.submit_code(&code, &topic).await)
                    }
                    Err(e) => {
                        error!("Failed to parse message from {}: {}", peer, e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Failed to parse message: {}", e),
                        };
                        if !send_frame(&mut tx, peer, &error_msg).await {
                            break;
                        }
                        continue;
                    }
                };

                if let Some(content) = reply {
                    let server_msg = ServerMessage::Response {
                        content,
                        timestamp: Utc::now().timestamp(),
                    };
                    if !send_frame(&mut tx, peer, &server_msg).await {
                        break;
                    }
                }
            }
            Message::Close(_) => {
                info!("Received close frame from {}", peer);
                break;
            }
            Message::Ping(ping_data) => {
                if tx.send(Message::Pong(ping_data)).await.is_err() {
                    error!("Failed to send pong to {}", peer);
                    break;
                }
            }
            Message::Pong(_) => {}
            Message::Binary(_) => {
                warn!("Ignoring binary message from {}", peer);
            }
            Message::Frame(_) => {}
        }
    }
    info!("WebSocket connection closed for {}", peer);
}
