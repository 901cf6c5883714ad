//! crates/research_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Name shown for any document id that does not resolve in the store.
pub const UNKNOWN_DOCUMENT: &str = "Unknown Document";

/// Processing state of a document. An errored document always carries its detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Processing,
    Ready,
    Error { detail: String },
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Error { .. } => "error",
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            DocumentStatus::Error { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Extraction metadata reported by the backend once a document is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub page_count: u32,
    pub word_count: u64,
    /// OCR / extraction confidence, clamped into `[0, 1]`.
    pub confidence: f32,
}

impl DocumentMeta {
    pub fn new(page_count: u32, word_count: u64, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            page_count,
            word_count,
            confidence,
        }
    }
}

/// A document uploaded in the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// MIME type when the client knew it, otherwise the lower-cased extension.
    pub kind: String,
    /// Opaque token grouping documents uploaded together.
    pub upload_timestamp: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub content: Option<String>,
    pub meta: Option<DocumentMeta>,
}

/// A partial update for a [`Document`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub upload_timestamp: Option<String>,
    pub size_bytes: Option<u64>,
    pub status: Option<DocumentStatus>,
    pub content: Option<String>,
    pub meta: Option<DocumentMeta>,
}

/// One citation returned alongside a per-document answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub page: String,
    pub paragraph: String,
    /// The exact marker text as it appears inside the answer. Join key for segmentation.
    pub full_citation_text: String,
}

/// The answer a single document gave to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResponse {
    pub document_id: String,
    pub document_name: String,
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// A theme spanning several documents. `document_ids` are references only
/// and may point at documents that no longer exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub id: String,
    pub title: String,
    pub description: String,
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Represents one entry of the conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub document_responses: Option<Vec<DocumentResponse>>,
    pub themes: Option<Vec<Theme>>,
}

/// A file the user picked for upload, not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: bytes::Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: bytes::Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lower-cased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn kind(&self) -> String {
        match &self.mime_type {
            Some(mime) if !mime.is_empty() => mime.clone(),
            _ => self.extension().unwrap_or_default(),
        }
    }
}

/// Backend confirmation of one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub document_id: String,
    pub filename: String,
    pub pages: u32,
    pub word_count: u64,
    pub confidence: f32,
    pub timestamp: String,
}

/// One document's raw answer as returned by the query backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnswer {
    pub doc_id: String,
    pub response: String,
    pub citations: Vec<Citation>,
}

/// The full result of a query across the session's documents.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub combined_answer: String,
    pub results: Vec<DocumentAnswer>,
}
