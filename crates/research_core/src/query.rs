//! crates/research_core/src/query.rs
//!
//! Sends a question to the backend, scoped to the session's timestamps, and
//! turns the raw per-document results into [`DocumentResponse`]s.

use tracing::{info, warn};

use crate::domain::{DocumentResponse, QueryAnswer, Theme};
use crate::ports::{PortError, QueryService, ThemeService};
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("The question is empty")]
    EmptyQuery,
    #[error("Upload at least one document before asking a question")]
    NoDocuments,
    #[error("Query failed: {0}")]
    Network(#[from] PortError),
}

/// Everything the backend said about one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub answer: QueryAnswer,
    pub themes: Vec<Theme>,
}

/// Asks the question, then fetches themes for the same scope. Theme
/// failures are logged and yield no themes.
pub async fn fetch_answer(
    queries: &dyn QueryService,
    themes: &dyn ThemeService,
    query: &str,
    timestamps: &[String],
) -> Result<QueryOutcome, QueryError> {
    info!(scope = timestamps.len(), "Sending query to backend.");
    let answer = queries.query_documents(query, timestamps).await?;

    let themes = match themes.identify_themes(timestamps).await {
        Ok(themes) => themes,
        Err(e) => {
            warn!(error = %e, "Theme identification failed, continuing without themes.");
            Vec::new()
        }
    };

    Ok(QueryOutcome { answer, themes })
}

/// Maps backend results to responses, naming each document from the store.
pub fn build_responses(answer: &QueryAnswer, store: &DocumentStore) -> Vec<DocumentResponse> {
    answer
        .results
        .iter()
        .map(|result| DocumentResponse {
            document_id: result.doc_id.clone(),
            document_name: store.document_name(&result.doc_id).to_string(),
            answer: result.response.clone(),
            citations: result.citations.clone(),
        })
        .collect()
}

/// Case-insensitive match on document name or answer text.
pub fn filter_responses<'a>(
    responses: &'a [DocumentResponse],
    term: &str,
) -> Vec<&'a DocumentResponse> {
    let needle = term.to_lowercase();
    responses
        .iter()
        .filter(|r| {
            r.document_name.to_lowercase().contains(&needle)
                || r.answer.to_lowercase().contains(&needle)
        })
        .collect()
}
