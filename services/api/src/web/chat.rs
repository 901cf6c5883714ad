//! services/api/src/web/chat.rs
//!
//! Axum handlers for asking questions and reading the conversation back.

use crate::web::{
    render::{message_view, response_rows, theme_overview_view},
    rest::{MessageView, QueryRequest, ResponseRowView, SearchParams, ThemeOverviewView},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use research_core::{
    domain::ChatMessage,
    query::{fetch_answer, filter_responses, QueryError},
    themes,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

fn query_error(e: QueryError) -> (StatusCode, String) {
    let status = match &e {
        QueryError::EmptyQuery => StatusCode::BAD_REQUEST,
        QueryError::NoDocuments => StatusCode::CONFLICT,
        QueryError::Network(_) => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        error!("Query failed: {}", e);
    } else {
        warn!("Query rejected: {}", e);
    }
    (status, e.to_string())
}

fn find_message(messages: &[ChatMessage], id: Uuid) -> Result<&ChatMessage, (StatusCode, String)> {
    messages
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Message {} not found", id)))
}

/// Ask a question across every document in the session.
///
/// The question is recorded in the conversation before the backend is called,
/// and stays there if the backend fails.
#[utoipa::path(
    post,
    path = "/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = MessageView),
        (status = 400, description = "The question is empty"),
        (status = 409, description = "No documents have been uploaded"),
        (status = 502, description = "The analysis backend failed")
    )
)]
pub async fn query_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scope = {
        let mut session = app_state.session.lock().await;
        session.prepare_query(&request.query).map_err(query_error)?
    };

    let outcome = fetch_answer(
        app_state.queries.as_ref(),
        app_state.themes.as_ref(),
        request.query.trim(),
        &scope,
    )
    .await
    .map_err(query_error)?;

    let mut session = app_state.session.lock().await;
    let id = session.record_answer(outcome).id;
    info!(message = %id, "Assistant reply recorded.");
    let message = find_message(session.chat.messages(), id)?;
    Ok(Json(message_view(message, &session.highlight)))
}

/// The whole conversation, oldest first.
#[utoipa::path(
    get,
    path = "/messages",
    responses((status = 200, description = "All chat messages", body = [MessageView]))
)]
pub async fn list_messages_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = app_state.session.lock().await;
    let messages: Vec<MessageView> = session
        .chat
        .messages()
        .iter()
        .map(|m| message_view(m, &session.highlight))
        .collect();
    Json(messages)
}

/// Clear the conversation.
#[utoipa::path(
    delete,
    path = "/messages",
    responses((status = 204, description = "Conversation cleared"))
)]
pub async fn clear_messages_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    let mut session = app_state.session.lock().await;
    session.chat.clear();
    session.highlight.clear_active();
    session.highlight.clear_hovered_group();
    StatusCode::NO_CONTENT
}

/// The response table of one assistant message, filtered by document name or answer text.
#[utoipa::path(
    get,
    path = "/messages/{message_id}/responses",
    params(
        ("message_id" = Uuid, Path, description = "The assistant message id."),
        SearchParams
    ),
    responses(
        (status = 200, description = "Matching response rows", body = [ResponseRowView]),
        (status = 404, description = "No such message")
    )
)]
pub async fn message_responses_handler(
    State(app_state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = app_state.session.lock().await;
    let message = find_message(session.chat.messages(), message_id)?;
    let responses = message.document_responses.as_deref().unwrap_or_default();
    let term = params.search.unwrap_or_default();
    let rows: Vec<ResponseRowView> =
        response_rows(filter_responses(responses, term.trim()), &session.highlight);
    Ok(Json(rows))
}

/// Theme cards for one assistant message, measured against the current documents.
#[utoipa::path(
    get,
    path = "/themes/{message_id}",
    params(("message_id" = Uuid, Path, description = "The assistant message id.")),
    responses(
        (status = 200, description = "Theme overviews", body = [ThemeOverviewView]),
        (status = 404, description = "No such message")
    )
)]
pub async fn theme_overviews_handler(
    State(app_state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = app_state.session.lock().await;
    let message = find_message(session.chat.messages(), message_id)?;
    let overviews: Vec<ThemeOverviewView> = message
        .themes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|theme| theme_overview_view(themes::overview(theme, &session.documents)))
        .collect();
    Ok(Json(overviews))
}
