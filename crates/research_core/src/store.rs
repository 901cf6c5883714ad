//! crates/research_core/src/store.rs
//!
//! The canonical, in-memory set of documents for one session, plus the
//! user's selection over them.

use std::collections::HashSet;

use crate::domain::{Document, DocumentPatch, DocumentStatus, UNKNOWN_DOCUMENT};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("A document with id {0} already exists")]
    DuplicateId(String),
}

/// Ordered document records and a selection set keyed by id.
///
/// Ids are unique at all times and the selection never holds an id that is
/// not in the store.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    selected: HashSet<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document.
    pub fn add(&mut self, document: Document) -> Result<(), StoreError> {
        if self.position(&document.id).is_some() {
            return Err(StoreError::DuplicateId(document.id));
        }
        self.documents.push(document);
        Ok(())
    }

    /// Merges `patch` into the record with `id`. Returns `false` when no such record exists.
    pub fn update(&mut self, id: &str, patch: DocumentPatch) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };

        if let Some(name) = patch.name {
            doc.name = name;
        }
        if let Some(kind) = patch.kind {
            doc.kind = kind;
        }
        if let Some(timestamp) = patch.upload_timestamp {
            doc.upload_timestamp = timestamp;
        }
        if let Some(size) = patch.size_bytes {
            doc.size_bytes = size;
        }
        if let Some(status) = patch.status {
            doc.status = status;
        }
        if let Some(content) = patch.content {
            doc.content = Some(content);
        }
        if let Some(meta) = patch.meta {
            doc.meta = Some(meta);
        }
        true
    }

    /// Replaces the record in the placeholder's slot with `confirmed`, which
    /// usually carries a new id. A missing placeholder makes this a no-op.
    pub fn replace_placeholder(
        &mut self,
        placeholder_id: &str,
        confirmed: Document,
    ) -> Result<bool, StoreError> {
        let Some(slot) = self.position(placeholder_id) else {
            return Ok(false);
        };
        if confirmed.id != placeholder_id && self.position(&confirmed.id).is_some() {
            return Err(StoreError::DuplicateId(confirmed.id));
        }
        self.selected.remove(placeholder_id);
        self.documents[slot] = confirmed;
        Ok(true)
    }

    /// Deletes the record and its selection entry. Idempotent.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        self.selected.remove(id);
        let slot = self.position(id)?;
        Some(self.documents.remove(slot))
    }

    /// Deletes every selected document and returns them in store order.
    pub fn remove_selected(&mut self) -> Vec<Document> {
        let selected = std::mem::take(&mut self.selected);
        let (removed, kept): (Vec<Document>, Vec<Document>) = std::mem::take(&mut self.documents)
            .into_iter()
            .partition(|d| selected.contains(&d.id));
        self.documents = kept;
        removed
    }

    pub fn list_all(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Name for `id`, or the "Unknown Document" label when it does not resolve.
    pub fn document_name(&self, id: &str) -> &str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or(UNKNOWN_DOCUMENT)
    }

    /// Case-insensitive substring match on document names.
    pub fn search(&self, term: &str) -> Vec<&Document> {
        let needle = term.to_lowercase();
        self.documents
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .collect()
    }

    // --- Selection ---

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) && self.position(id).is_some() {
            self.selected.insert(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn select_all(&mut self) {
        self.selected = self.documents.iter().map(|d| d.id.clone()).collect();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in store order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.documents
            .iter()
            .filter(|d| self.selected.contains(&d.id))
            .map(|d| d.id.as_str())
            .collect()
    }

    /// Distinct upload timestamps of Processing and Ready documents, first-seen order.
    /// Computed on every call.
    pub fn session_timestamps(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut timestamps = Vec::new();
        for doc in &self.documents {
            if matches!(doc.status, DocumentStatus::Error { .. }) {
                continue;
            }
            if seen.insert(doc.upload_timestamp.as_str()) {
                timestamps.push(doc.upload_timestamp.clone());
            }
        }
        timestamps
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }
}
