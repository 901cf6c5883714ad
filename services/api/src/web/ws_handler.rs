//! services/api/src/web/ws_handler.rs
//!
//! The entry point and control loop for a highlight WebSocket connection.
//! Every client message updates the session's highlight coordinator and is
//! answered with a fresh snapshot of the latest assistant reply.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    render::response_rows,
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use research_core::{citations, ResearchSession};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New highlight WebSocket connection established.");
    let (mut sender, mut receiver) = socket.split();

    let initial = snapshot(&*app_state.session.lock().await);
    if !send_message(&mut sender, &initial).await {
        return;
    }

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(client_message) => {
                        debug!(?client_message, "Received highlight message.");
                        let mut session = app_state.session.lock().await;
                        match apply(&mut session, client_message) {
                            Ok(()) => snapshot(&session),
                            Err(message) => ServerMessage::Error { message },
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        }
                    }
                };
                if !send_message(&mut sender, &reply).await {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Highlight WebSocket connection closed.");
}

async fn send_message(sender: &mut SplitSink<WebSocket, Message>, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {:?}", e);
            return true;
        }
    };
    if sender.send(Message::Text(json.into())).await.is_err() {
        error!("Failed to send message to client.");
        return false;
    }
    true
}

/// Applies one client message to the session's highlight state.
pub(crate) fn apply(session: &mut ResearchSession, message: ClientMessage) -> Result<(), String> {
    match message {
        ClientMessage::ActivateCitation {
            document_id,
            citation_text,
        } => session.highlight.set_active(document_id, citation_text),
        ClientMessage::ClearActive => session.highlight.clear_active(),
        ClientMessage::HoverParagraph {
            document_id,
            paragraph_index,
        } => {
            let response = session
                .chat
                .latest_assistant()
                .and_then(|m| m.document_responses.as_deref())
                .and_then(|responses| responses.iter().find(|r| r.document_id == document_id))
                .ok_or_else(|| format!("No response for document {}", document_id))?;
            let group = citations::segment(&response.answer, &response.citations)
                .into_iter()
                .nth(paragraph_index)
                .map(|p| p.citation_texts)
                .ok_or_else(|| {
                    format!(
                        "Paragraph {} does not exist for document {}",
                        paragraph_index, document_id
                    )
                })?;
            session.highlight.set_hovered_group(group);
        }
        ClientMessage::ClearHover => session.highlight.clear_hovered_group(),
    }
    Ok(())
}

pub(crate) fn snapshot(session: &ResearchSession) -> ServerMessage {
    let latest = session.chat.latest_assistant();
    ServerMessage::HighlightState {
        message_id: latest.map(|m| m.id),
        rows: latest
            .and_then(|m| m.document_responses.as_deref())
            .map(|responses| response_rows(responses, &session.highlight))
            .unwrap_or_default(),
    }
}
