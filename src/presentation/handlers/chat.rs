use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::application::ports::{ChatResponder, CompletionBackend, PageExtractor};
use crate::presentation::state::AppState;

/// Wire format shared by both directions of the chat socket.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ChatMessage {
    fn new(kind: &str, content: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            content: content.into(),
            error: None,
        }
    }

    fn error(detail: impl Into<String>) -> Self {
        Self {
            kind: "error".to_string(),
            content: String::new(),
            error: Some(detail.into()),
        }
    }
}

#[tracing::instrument(skip(state, ws))]
pub async fn chat_socket_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let responder = Arc::clone(&state.chat_responder);
    ws.on_upgrade(move |socket| handle_socket(socket, responder))
}

async fn handle_socket<C>(socket: WebSocket, responder: Arc<C>)
where
    C: ChatResponder + 'static,
{
    tracing::info!("Chat session opened");
    let (mut sink, mut stream) = socket.split();

    // All outbound frames funnel through one writer task so concurrent
    // responders never interleave writes on the socket.
    let (tx, mut rx) = mpsc::channel::<ChatMessage>(16);
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let welcome = ChatMessage::new(
        "system",
        "Connected to TenderSift! Ask me anything about tenders, eligibility, or bid preparation.",
    );
    if tx.send(welcome).await.is_err() {
        writer.await.ok();
        return;
    }

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            Message::Text(text) => {
                let Ok(incoming) = serde_json::from_str::<ChatMessage>(&text) else {
                    // A bad frame is the client's problem, not grounds to
                    // tear down the session.
                    if tx
                        .send(ChatMessage::error("Invalid message format"))
                        .await
                        .is_err()
                    {
                        break;
                    }
                    continue;
                };
                if dispatch(incoming, &tx, &responder).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    drop(tx);
    writer.await.ok();
    tracing::info!("Chat session closed");
}

async fn dispatch<C>(
    incoming: ChatMessage,
    tx: &mpsc::Sender<ChatMessage>,
    responder: &Arc<C>,
) -> Result<(), mpsc::error::SendError<ChatMessage>>
where
    C: ChatResponder + 'static,
{
    match incoming.kind.as_str() {
        "user_message" => {
            tracing::info!(chars = incoming.content.len(), "Chat message received");
            let tx = tx.clone();
            let responder = Arc::clone(responder);
            tokio::spawn(async move {
                let typing = ChatMessage::new("typing", "TenderSift is thinking...");
                if tx.send(typing).await.is_err() {
                    return;
                }
                let outgoing = match responder.respond(&incoming.content).await {
                    Ok(reply) => ChatMessage::new("ai_response", reply),
                    Err(e) => {
                        tracing::error!(error = %e, "Chat completion failed");
                        ChatMessage::error(
                            "Sorry, I'm having trouble processing your request. Please try again.",
                        )
                    }
                };
                tx.send(outgoing).await.ok();
            });
            Ok(())
        }
        "ping" => tx.send(ChatMessage::new("pong", "pong")).await,
        _ => tx.send(ChatMessage::error("Unknown message type")).await,
    }
}
