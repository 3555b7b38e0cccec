pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::{AppState, Call, CallError};
use crate::types::{Participant, Role};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub role: Option<String>,
    /// Call to join (peers only)
    pub call: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl WsQuery {
    fn role(&self) -> Role {
        match self.role.as_deref() {
            Some("peer") => Role::Peer,
            _ => Role::Caller,
        }
    }

    fn participant(&self) -> Option<Participant> {
        self.name.as_ref().map(|name| Participant {
            name: name.clone(),
            image: self.image.clone(),
        })
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection request: role={:?}, call={:?}",
        params.role,
        params.call
    );

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Callers open a new call, peers attach to an existing one
async fn open_call(role: &Role, params: &WsQuery, state: &AppState) -> Result<Call, CallError> {
    match role {
        Role::Caller => Ok(state.create_call(params.participant()).await),
        Role::Peer => {
            let id = params.call.as_deref().ok_or(CallError::MissingCallId)?;
            state.join_call(id, params.participant()).await
        }
    }
}

async fn send_json(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            true
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let role = params.role();

    let call = match open_call(&role, &params, &state).await {
        Ok(call) => call,
        Err(e) => {
            tracing::warn!("Rejecting {:?} connection: {}", role, e);
            let _ = send_json(&mut sender, &ServerMessage::error(e.code(), e.to_string())).await;
            return;
        }
    };

    tracing::info!("WebSocket connected with role {:?} on call {}", role, call.id);

    // Subscribe before the welcome so nothing published in between is lost
    let mut updates = call.game.subscribe();

    let welcome = ServerMessage::Welcome {
        protocol: PROTOCOL_VERSION.to_string(),
        role: role.clone(),
        call_id: call.id.clone(),
        participant: match role {
            Role::Caller => call.peer.clone(),
            Role::Peer => call.caller.clone(),
        },
        counterpart: call.game.counterpart_mode(),
        state: call.game.snapshot().await,
        server_now: chrono::Utc::now().to_rfc3339(),
    };

    if send_json(&mut sender, &welcome).await {
        loop {
            tokio::select! {
                update = updates.recv() => {
                    match update {
                        Ok(msg) => {
                            let ended = matches!(msg, ServerMessage::CallEnded);
                            if !send_json(&mut sender, &msg).await || ended {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Connection lagged, skipped {} updates", skipped);
                            let state = call.game.snapshot().await;
                            if !send_json(&mut sender, &ServerMessage::GameState { state }).await {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                    }
                }

                ws_msg = receiver.next() => {
                    match ws_msg {
                        Some(Ok(Message::Text(text))) => {
                            tracing::debug!("Received message: {}", text);

                            let response = match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => {
                                    handlers::handle_message(client_msg, &role, &call, &state).await
                                }
                                Err(e) => {
                                    tracing::error!("Failed to parse client message: {}", e);
                                    Some(ServerMessage::error(
                                        "PARSE_ERROR",
                                        format!("Invalid message format: {}", e),
                                    ))
                                }
                            };

                            if let Some(response) = response {
                                if !send_json(&mut sender, &response).await {
                                    tracing::error!("Failed to send response");
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("WebSocket closed");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if sender.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("WebSocket error: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
            }
        }
    } else {
        tracing::error!("Failed to send welcome message");
    }

    match role {
        Role::Caller => {
            state.end_call(&call.id).await;
        }
        Role::Peer => state.leave_call(&call.id).await,
    }

    tracing::info!("WebSocket connection closed for role {:?} on call {}", role, call.id);
}
