//! crates/research_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external analysis backend.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the transport used to reach the backend.

use async_trait::async_trait;

use crate::domain::{CandidateFile, QueryAnswer, Theme, UploadedDocument};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors of the transport (e.g., HTTP client, decoding).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request never produced a response.
    #[error("Network failure: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("Backend rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UploadService: Send + Sync {
    /// Submits one batch of files. Results come back in submission order.
    async fn upload_batch(&self, files: &[CandidateFile]) -> PortResult<Vec<UploadedDocument>>;
}

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Asks every document in the given timestamp scope the same question.
    async fn query_documents(&self, query: &str, timestamps: &[String]) -> PortResult<QueryAnswer>;
}

#[async_trait]
pub trait ThemeService: Send + Sync {
    /// Identifies themes across the documents in the given timestamp scope.
    async fn identify_themes(&self, timestamps: &[String]) -> PortResult<Vec<Theme>>;
}
