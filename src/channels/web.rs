//! Web chat channel: WebSocket transport for browser and app clients.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// Channel name used for routing.
pub const WEB_CHANNEL: &str = "web";

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Message from client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientMessage {
    #[serde(rename = "message")]
    Message {
        content: String,
        conversation_id: Option<String>,
    },
}

/// Message from server → client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ServerMessage {
    #[serde(rename = "response")]
    Response {
        content: String,
        conversation_id: String,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

// ── Shared State ────────────────────────────────────────────────────────

struct WebChannelInner {
    /// WS handlers → `Channel::start` stream.
    incoming_tx: mpsc::UnboundedSender<IncomingMessage>,
    /// `Channel::respond` → WS handlers. Each handler filters by its own conversations.
    outgoing_tx: broadcast::Sender<ServerMessage>,
}

#[derive(Clone)]
struct WsState {
    inner: Arc<WebChannelInner>,
}

// ── WebChatChannel ──────────────────────────────────────────────────────

/// A WebSocket channel serving `/ws/chat`.
///
/// - `start()` returns a stream backed by an mpsc receiver fed by socket handlers.
/// - `respond()` broadcasts to all sockets; a socket forwards only responses for
///   conversations it has sent messages in.
/// - A client that omits `conversation_id` is given a fresh one per socket,
///   echoed back on every response.
/// - Client ids are stored as `web:{id}`, so a web client can never address
///   another channel's conversation.
pub struct WebChatChannel {
    inner: Arc<WebChannelInner>,
    /// Receiver side of the incoming channel, consumed once in `start()`.
    incoming_rx: Mutex<Option<mpsc::UnboundedReceiver<IncomingMessage>>>,
}

impl Default for WebChatChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl WebChatChannel {
    pub fn new() -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, _) = broadcast::channel(256);

        Self {
            inner: Arc::new(WebChannelInner {
                incoming_tx,
                outgoing_tx,
            }),
            incoming_rx: Mutex::new(Some(incoming_rx)),
        }
    }

    /// Build an Axum router with the `/ws/chat` endpoint.
    pub fn router(&self) -> Router {
        let state = WsState {
            inner: Arc::clone(&self.inner),
        };

        Router::new()
            .route("/ws/chat", get(ws_chat_handler))
            .with_state(state)
    }
}

#[async_trait]
impl Channel for WebChatChannel {
    fn name(&self) -> &str {
        WEB_CHANNEL
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let rx = self
            .incoming_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| ChannelError::StartupFailed {
                name: WEB_CHANNEL.to_string(),
                reason: "start() already called".to_string(),
            })?;

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        // Clients see their own id; the `web:` prefix stays server-side.
        let server_msg = ServerMessage::Response {
            content: response.content,
            conversation_id: msg.user_id.clone(),
        };
        // No subscribers means no connected clients
        let _ = self.inner.outgoing_tx.send(server_msg);
        Ok(())
    }
}

// ── WebSocket Handler ───────────────────────────────────────────────────

async fn ws_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_chat_socket(socket, state.inner))
}

async fn handle_chat_socket(mut socket: WebSocket, inner: Arc<WebChannelInner>) {
    let default_conversation = Uuid::new_v4().to_string();
    let mut conversations: HashSet<String> = HashSet::new();
    info!(conversation_id = %default_conversation, "Web chat client connected");

    let mut outgoing_rx = inner.outgoing_tx.subscribe();

    loop {
        tokio::select! {
            result = outgoing_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if let ServerMessage::Response { conversation_id, .. } = &msg {
                            if !conversations.contains(conversation_id) {
                                continue;
                            }
                        }
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if socket.send(Message::Text(json.into())).await.is_err() {
                                debug!("Web chat client disconnected during send");
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Web chat client lagged behind broadcast");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Web chat broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Message { content, conversation_id }) => {
                                let content = content.trim().to_string();
                                if content.is_empty() {
                                    continue;
                                }
                                let conversation_id = conversation_id
                                    .filter(|id| !id.trim().is_empty())
                                    .unwrap_or_else(|| default_conversation.clone());
                                conversations.insert(conversation_id.clone());
                                let msg = IncomingMessage::new(WEB_CHANNEL, &conversation_id, &content);
                                if inner.incoming_tx.send(msg).is_err() {
                                    warn!("Web chat incoming channel closed");
                                    break;
                                }
                            }
                            Err(e) => {
                                debug!(error = %e, "Invalid JSON from web chat client");
                                let reply = ServerMessage::Error {
                                    message: format!("invalid message: {e}"),
                                };
                                if let Ok(json) = serde_json::to_string(&reply) {
                                    if socket.send(Message::Text(json.into())).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Web chat client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Web chat WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_parses_with_and_without_conversation() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"message","content":"hi","conversation_id":"c1"}"#)
                .unwrap();
        let ClientMessage::Message {
            content,
            conversation_id,
        } = msg;
        assert_eq!(content, "hi");
        assert_eq!(conversation_id.as_deref(), Some("c1"));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"message","content":"hi"}"#).unwrap();
        let ClientMessage::Message { conversation_id, .. } = msg;
        assert!(conversation_id.is_none());
    }

    #[test]
    fn server_response_shape() {
        let json = serde_json::to_value(ServerMessage::Response {
            content: "hello".into(),
            conversation_id: "c1".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "response", "content": "hello", "conversation_id": "c1"})
        );
    }

    #[tokio::test]
    async fn start_can_only_be_called_once() {
        let channel = WebChatChannel::new();
        assert!(channel.start().await.is_ok());
        assert!(matches!(
            channel.start().await,
            Err(ChannelError::StartupFailed { .. })
        ));
    }

    #[tokio::test]
    async fn respond_echoes_client_id_without_prefix() {
        let channel = WebChatChannel::new();
        let mut outgoing = channel.inner.outgoing_tx.subscribe();

        let msg = IncomingMessage::new(WEB_CHANNEL, "cli:local-user", "hi");
        assert_eq!(msg.conversation_id, "web:cli:local-user");

        channel
            .respond(&msg, OutgoingResponse::text("hello"))
            .await
            .unwrap();
        match outgoing.recv().await.unwrap() {
            ServerMessage::Response {
                conversation_id, ..
            } => assert_eq!(conversation_id, "cli:local-user"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}
