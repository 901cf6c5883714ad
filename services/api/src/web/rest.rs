//! services/api/src/web/rest.rs
//!
//! Contains the payload types of the REST API and the master definition for
//! the OpenAPI specification. The handlers live in `documents` and `chat`.

use crate::web::{chat, documents};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        documents::list_documents_handler,
        documents::upload_documents_handler,
        documents::resolve_conflicts_handler,
        documents::delete_document_handler,
        documents::toggle_selection_handler,
        documents::select_all_handler,
        documents::clear_selection_handler,
        documents::delete_selected_handler,
        chat::query_handler,
        chat::list_messages_handler,
        chat::clear_messages_handler,
        chat::message_responses_handler,
        chat::theme_overviews_handler,
    ),
    components(
        schemas(
            DocumentView,
            DocumentListResponse,
            ConflictView,
            UploadResponse,
            ResolveRequest,
            QueryRequest,
            MessageView,
            ThemeView,
            ResponseRowView,
            ParagraphView,
            CitationRefView,
            CitationEntryView,
            ThemeOverviewView,
        )
    ),
    tags(
        (name = "Document Research API", description = "Upload documents, ask questions across them and inspect cited answers.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Request Payloads
//=========================================================================================

/// Optional case-insensitive search term.
#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// The user's answer to a pending name conflict.
#[derive(Deserialize, ToSchema, Debug)]
pub struct ResolveRequest {
    /// `true` replaces the existing documents, `false` skips the conflicting files.
    pub overwrite: bool,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct QueryRequest {
    pub query: String,
}

//=========================================================================================
// Document Payloads
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub upload_timestamp: String,
    pub size_bytes: u64,
    /// One of `processing`, `ready` or `error`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentView>,
    pub total: usize,
    pub selected_count: usize,
    pub session_timestamps: Vec<String>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ConflictView {
    pub file_name: String,
    pub existing_id: String,
}

/// The outcome of an upload or of a conflict resolution.
#[derive(Serialize, ToSchema, Debug)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadResponse {
    /// The batch went through; these records replaced their placeholders.
    Uploaded { documents: Vec<DocumentView> },
    /// Some files share a name with stored documents. Answer with `/documents/resolve`.
    NeedsResolution { conflicts: Vec<ConflictView> },
    /// Nothing needed sending.
    Skipped,
}

//=========================================================================================
// Chat Payloads
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ThemeView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub document_ids: Vec<String>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct MessageView {
    pub id: Uuid,
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<ResponseRowView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<ThemeView>>,
}

/// One document's answer, split into cited paragraphs.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ResponseRowView {
    pub document_id: String,
    pub document_name: String,
    pub answer: String,
    pub paragraphs: Vec<ParagraphView>,
    pub citations: Vec<CitationEntryView>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ParagraphView {
    pub text: String,
    pub citations: Vec<CitationRefView>,
    pub highlighted: bool,
}

/// A marker from the answer text, joined against the row's citations.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CitationRefView {
    Resolved {
        page: String,
        paragraph: String,
        full_citation_text: String,
    },
    Raw {
        marker: String,
    },
}

/// An entry of the row's citation list.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct CitationEntryView {
    pub page: String,
    pub paragraph: String,
    pub full_citation_text: String,
    pub highlighted: bool,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ThemeOverviewView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub document_count: usize,
    pub preview_names: Vec<String>,
    pub remaining: usize,
    pub coverage_percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/documents",
            "/documents/resolve",
            "/documents/{id}",
            "/documents/selection/toggle/{id}",
            "/documents/selected",
            "/query",
            "/messages",
            "/messages/{message_id}/responses",
            "/themes/{message_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
