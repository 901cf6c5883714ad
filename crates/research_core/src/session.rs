//! crates/research_core/src/session.rs
//!
//! The explicitly scoped context for one research session. It owns the
//! document store and every piece of state that reads or writes it; nothing
//! here is global. Created once per session and dropped when it ends.

use crate::chat::ChatLog;
use crate::domain::{CandidateFile, ChatMessage, Document, UploadedDocument};
use crate::highlight::HighlightCoordinator;
use crate::ports::PortResult;
use crate::query::{build_responses, QueryError, QueryOutcome};
use crate::store::DocumentStore;
use crate::upload::{BatchTicket, PreparedBatch, UploadCoordinator, UploadError, UploadStep};

#[derive(Debug, Default)]
pub struct ResearchSession {
    pub documents: DocumentStore,
    pub uploads: UploadCoordinator,
    pub highlight: HighlightCoordinator,
    pub chat: ChatLog,
}

impl ResearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_upload(&mut self, files: Vec<CandidateFile>) -> Result<UploadStep, UploadError> {
        self.uploads.begin(&mut self.documents, files)
    }

    pub fn resolve_upload(&mut self, overwrite: bool) -> Result<UploadStep, UploadError> {
        self.uploads.resolve(&mut self.documents, overwrite)
    }

    pub fn complete_upload(
        &mut self,
        batch: PreparedBatch,
        outcome: PortResult<Vec<UploadedDocument>>,
    ) -> Result<Vec<Document>, UploadError> {
        self.uploads.complete(&mut self.documents, batch, outcome)
    }

    /// Drops a sent batch whose outcome will never arrive.
    pub fn abandon_upload(&mut self, ticket: &BatchTicket) -> bool {
        self.uploads.abandon(&mut self.documents, ticket)
    }

    /// Validates the question, records it in the chat and returns the
    /// timestamp scope the backend should search.
    pub fn prepare_query(&mut self, query: &str) -> Result<Vec<String>, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if self.documents.is_empty() {
            return Err(QueryError::NoDocuments);
        }
        self.chat.add_user_message(query);
        Ok(self.documents.session_timestamps())
    }

    /// Appends the assistant's reply built from a backend outcome.
    pub fn record_answer(&mut self, outcome: QueryOutcome) -> &ChatMessage {
        let responses = build_responses(&outcome.answer, &self.documents);
        self.highlight.clear_active();
        self.highlight.clear_hovered_group();
        self.chat.add_assistant_message(
            outcome.answer.combined_answer,
            Some(responses),
            Some(outcome.themes),
        )
    }
}
