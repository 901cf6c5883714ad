pub mod chat;
pub mod documents;
pub mod protocol;
pub mod render;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;

use chat::{
    clear_messages_handler, list_messages_handler, message_responses_handler, query_handler,
    theme_overviews_handler,
};
use documents::{
    clear_selection_handler, delete_document_handler, delete_selected_handler,
    list_documents_handler, resolve_conflicts_handler, select_all_handler,
    toggle_selection_handler, upload_documents_handler,
};
use state::AppState;

/// Builds the API routes. Layers (CORS, body limits, Swagger UI) are added by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/documents",
            get(list_documents_handler).post(upload_documents_handler),
        )
        .route("/documents/resolve", post(resolve_conflicts_handler))
        .route("/documents/selected", delete(delete_selected_handler))
        .route("/documents/selection", delete(clear_selection_handler))
        .route("/documents/selection/all", post(select_all_handler))
        .route(
            "/documents/selection/toggle/{id}",
            post(toggle_selection_handler),
        )
        .route("/documents/{id}", delete(delete_document_handler))
        .route("/query", post(query_handler))
        .route(
            "/messages",
            get(list_messages_handler).delete(clear_messages_handler),
        )
        .route(
            "/messages/{message_id}/responses",
            get(message_responses_handler),
        )
        .route("/themes/{message_id}", get(theme_overviews_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
