//! crates/research_core/src/upload.rs
//!
//! Validation, name-conflict partitioning and the optimistic
//! placeholder-then-reconcile protocol for upload batches.
//!
//! A batch moves through `Idle -> (PendingResolution) -> InFlight -> Idle`.
//! Only one batch may be outside `Idle` at a time; new uploads are rejected
//! (not queued) until the current one is resolved and reconciled.

use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CandidateFile, Document, DocumentMeta, DocumentStatus, UploadedDocument};
use crate::ports::{PortError, PortResult};
use crate::store::{DocumentStore, StoreError};

pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["pdf", "jpg", "jpeg", "png", "tiff"];

const PLACEHOLDER_PREFIX: &str = "pending-";

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    TooLarge { size_bytes: u64 },
    UnsupportedType { extension: Option<String> },
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::TooLarge { size_bytes } => write!(
                f,
                "file is {} bytes, the limit is {} bytes",
                size_bytes, MAX_FILE_SIZE_BYTES
            ),
            ValidationReason::UnsupportedType { extension: Some(ext) } => write!(
                f,
                "unsupported file type '.{}' (supported: {})",
                ext,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
            ValidationReason::UnsupportedType { extension: None } => write!(
                f,
                "file has no extension (supported: {})",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file {file}: {reason}")]
    Validation { file: String, reason: ValidationReason },
    #[error("Resolve the pending name conflicts before uploading more files")]
    ConflictPending,
    #[error("Another upload batch is still being processed")]
    BatchInFlight,
    #[error("There is no pending conflict resolution")]
    NoPendingResolution,
    #[error("Backend returned {actual} records for {expected} files")]
    MismatchedResultCount { expected: usize, actual: usize },
    #[error("Upload failed: {0}")]
    Network(#[from] PortError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

//=========================================================================================
// Validation and Partitioning
//=========================================================================================

/// Checks every file against the size limit and the supported extensions.
/// The first offending file aborts the whole batch.
pub fn validate_batch(files: &[CandidateFile]) -> Result<(), UploadError> {
    for file in files {
        if file.size_bytes() > MAX_FILE_SIZE_BYTES {
            return Err(UploadError::Validation {
                file: file.name.clone(),
                reason: ValidationReason::TooLarge {
                    size_bytes: file.size_bytes(),
                },
            });
        }
        let extension = file.extension();
        let supported = extension
            .as_deref()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
        if !supported {
            return Err(UploadError::Validation {
                file: file.name.clone(),
                reason: ValidationReason::UnsupportedType { extension },
            });
        }
    }
    Ok(())
}

/// A candidate file whose name is already taken in the store.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub file: CandidateFile,
    pub existing: Document,
}

#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub conflicts: Vec<Conflict>,
    pub unique: Vec<CandidateFile>,
}

/// Splits `files` by exact, case-sensitive name equality with existing documents.
pub fn partition(files: Vec<CandidateFile>, existing: &[Document]) -> Partition {
    let mut result = Partition::default();
    for file in files {
        match existing.iter().find(|doc| doc.name == file.name) {
            Some(doc) => result.conflicts.push(Conflict {
                file,
                existing: doc.clone(),
            }),
            None => result.unique.push(file),
        }
    }
    result
}

//=========================================================================================
// Batch Protocol
//=========================================================================================

/// What a caller has to tell the user about a conflicting file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictNotice {
    pub file_name: String,
    pub existing_id: String,
}

/// A batch whose placeholders already exist in the store and which is ready
/// to be sent. Only the coordinator can create one.
#[derive(Debug)]
pub struct PreparedBatch {
    id: Uuid,
    files: Vec<CandidateFile>,
    placeholder_ids: Vec<String>,
}

impl PreparedBatch {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn placeholder_ids(&self) -> &[String] {
        &self.placeholder_ids
    }

    /// A handle that can undo this batch if its outcome never arrives.
    pub fn ticket(&self) -> BatchTicket {
        BatchTicket {
            id: self.id,
            placeholder_ids: self.placeholder_ids.clone(),
        }
    }
}

/// Identifies a sent batch and its placeholders, for [`UploadCoordinator::abandon`].
#[derive(Debug, Clone)]
pub struct BatchTicket {
    id: Uuid,
    placeholder_ids: Vec<String>,
}

/// The next thing the caller must do after `begin` or `resolve`.
#[derive(Debug)]
pub enum UploadStep {
    /// Nothing left to send.
    Done,
    /// The user has to choose between skipping and overwriting.
    NeedsResolution(Vec<ConflictNotice>),
    /// Send the batch, then hand the outcome to [`UploadCoordinator::complete`].
    Submit(PreparedBatch),
}

#[derive(Debug, Default)]
enum GateState {
    #[default]
    Idle,
    PendingResolution(Partition),
    InFlight(Uuid),
}

/// Drives one upload batch at a time through resolution and reconciliation.
#[derive(Debug, Default)]
pub struct UploadCoordinator {
    state: GateState,
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending_resolution(&self) -> bool {
        matches!(self.state, GateState::PendingResolution(_))
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, GateState::InFlight(_))
    }

    /// Conflicts awaiting a decision, if any.
    pub fn pending_conflicts(&self) -> Vec<ConflictNotice> {
        match &self.state {
            GateState::PendingResolution(partition) => notices(&partition.conflicts),
            _ => Vec::new(),
        }
    }

    /// Starts a new batch: validates, partitions against the store and either
    /// parks on conflicts or creates the placeholders right away.
    pub fn begin(
        &mut self,
        store: &mut DocumentStore,
        files: Vec<CandidateFile>,
    ) -> Result<UploadStep, UploadError> {
        self.ensure_idle()?;
        validate_batch(&files)?;

        if files.is_empty() {
            return Ok(UploadStep::Done);
        }

        let partition = partition(files, store.list_all());
        if partition.conflicts.is_empty() {
            return self.submit(store, partition.unique);
        }

        info!(
            conflicts = partition.conflicts.len(),
            unique = partition.unique.len(),
            "Upload batch has name conflicts, waiting for resolution."
        );
        let conflicts = notices(&partition.conflicts);
        self.state = GateState::PendingResolution(partition);
        Ok(UploadStep::NeedsResolution(conflicts))
    }

    /// Applies the user's decision to the pending batch.
    pub fn resolve(
        &mut self,
        store: &mut DocumentStore,
        overwrite: bool,
    ) -> Result<UploadStep, UploadError> {
        let partition = match std::mem::take(&mut self.state) {
            GateState::PendingResolution(partition) => partition,
            other => {
                self.state = other;
                return Err(UploadError::NoPendingResolution);
            }
        };

        let Partition { conflicts, mut unique } = partition;
        if overwrite {
            for conflict in conflicts {
                store.remove(&conflict.existing.id);
                unique.push(conflict.file);
            }
        } else {
            info!(skipped = conflicts.len(), "Skipping conflicting files.");
        }

        if unique.is_empty() {
            return Ok(UploadStep::Done);
        }
        self.submit(store, unique)
    }

    /// Reconciles a sent batch with the backend outcome. Either every
    /// placeholder is replaced, or every placeholder is removed.
    pub fn complete(
        &mut self,
        store: &mut DocumentStore,
        batch: PreparedBatch,
        outcome: PortResult<Vec<UploadedDocument>>,
    ) -> Result<Vec<Document>, UploadError> {
        match self.state {
            GateState::InFlight(id) if id == batch.id => self.state = GateState::Idle,
            _ => warn!(batch = %batch.id, "Completing a batch that is not the one in flight."),
        }

        let records = match outcome {
            Ok(records) => records,
            Err(e) => {
                rollback(store, &batch.placeholder_ids);
                warn!(batch = %batch.id, error = %e, "Upload batch failed, placeholders removed.");
                return Err(UploadError::Network(e));
            }
        };

        if records.len() != batch.placeholder_ids.len() {
            rollback(store, &batch.placeholder_ids);
            warn!(
                batch = %batch.id,
                expected = batch.placeholder_ids.len(),
                actual = records.len(),
                "Backend result count does not match the batch, placeholders removed."
            );
            return Err(UploadError::MismatchedResultCount {
                expected: batch.placeholder_ids.len(),
                actual: records.len(),
            });
        }

        if let Err(e) = check_confirmed_ids(store, &batch.placeholder_ids, &records) {
            rollback(store, &batch.placeholder_ids);
            return Err(e.into());
        }

        let mut confirmed = Vec::with_capacity(records.len());
        for (placeholder_id, record) in batch.placeholder_ids.iter().zip(records) {
            let Some(placeholder) = store.get(placeholder_id) else {
                // Deleted by the user while the batch was in flight.
                continue;
            };
            let document = confirmed_document(placeholder, record);
            store.replace_placeholder(placeholder_id, document.clone())?;
            confirmed.push(document);
        }

        info!(batch = %batch.id, documents = confirmed.len(), "Upload batch reconciled.");
        Ok(confirmed)
    }

    /// Gives up on a batch whose outcome will never be reported. Its
    /// placeholders are removed and the gate reopens. A batch that was
    /// already completed is left alone.
    pub fn abandon(&mut self, store: &mut DocumentStore, ticket: &BatchTicket) -> bool {
        match self.state {
            GateState::InFlight(id) if id == ticket.id => {
                self.state = GateState::Idle;
                rollback(store, &ticket.placeholder_ids);
                warn!(batch = %ticket.id, "Upload batch abandoned, placeholders removed.");
                true
            }
            _ => false,
        }
    }

    fn ensure_idle(&self) -> Result<(), UploadError> {
        match self.state {
            GateState::Idle => Ok(()),
            GateState::PendingResolution(_) => Err(UploadError::ConflictPending),
            GateState::InFlight(_) => Err(UploadError::BatchInFlight),
        }
    }

    fn submit(
        &mut self,
        store: &mut DocumentStore,
        files: Vec<CandidateFile>,
    ) -> Result<UploadStep, UploadError> {
        let batch_id = Uuid::new_v4();
        let timestamp = Utc::now().to_rfc3339();
        let mut placeholder_ids = Vec::with_capacity(files.len());

        for file in &files {
            let placeholder = Document {
                id: format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4()),
                name: file.name.clone(),
                kind: file.kind(),
                upload_timestamp: timestamp.clone(),
                size_bytes: file.size_bytes(),
                status: DocumentStatus::Processing,
                content: None,
                meta: None,
            };
            let id = placeholder.id.clone();
            if let Err(e) = store.add(placeholder) {
                rollback(store, &placeholder_ids);
                self.state = GateState::Idle;
                return Err(e.into());
            }
            placeholder_ids.push(id);
        }

        info!(batch = %batch_id, files = files.len(), "Placeholders created, batch ready to send.");
        self.state = GateState::InFlight(batch_id);
        Ok(UploadStep::Submit(PreparedBatch {
            id: batch_id,
            files,
            placeholder_ids,
        }))
    }
}

/// True for ids minted locally for optimistic records.
pub fn is_placeholder_id(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

fn notices(conflicts: &[Conflict]) -> Vec<ConflictNotice> {
    conflicts
        .iter()
        .map(|c| ConflictNotice {
            file_name: c.file.name.clone(),
            existing_id: c.existing.id.clone(),
        })
        .collect()
}

fn rollback(store: &mut DocumentStore, placeholder_ids: &[String]) {
    for id in placeholder_ids {
        store.remove(id);
    }
}

/// Confirmed ids must be distinct and must not collide with records outside the batch.
fn check_confirmed_ids(
    store: &DocumentStore,
    placeholder_ids: &[String],
    records: &[UploadedDocument],
) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for record in records {
        let id = record.document_id.as_str();
        let taken_outside = store.get(id).is_some() && !placeholder_ids.iter().any(|p| p == id);
        if !seen.insert(id) || taken_outside {
            return Err(StoreError::DuplicateId(record.document_id.clone()));
        }
    }
    Ok(())
}

fn confirmed_document(placeholder: &Document, record: UploadedDocument) -> Document {
    Document {
        id: record.document_id,
        name: record.filename,
        kind: placeholder.kind.clone(),
        upload_timestamp: record.timestamp,
        size_bytes: placeholder.size_bytes,
        status: DocumentStatus::Ready,
        content: None,
        meta: Some(DocumentMeta::new(
            record.pages,
            record.word_count,
            record.confidence,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::doc;
    use bytes::Bytes;

    fn file(name: &str) -> CandidateFile {
        CandidateFile::new(name, None, Bytes::from_static(b"%PDF-1.7"))
    }

    fn record(id: &str, name: &str) -> UploadedDocument {
        UploadedDocument {
            document_id: id.to_string(),
            filename: name.to_string(),
            pages: 2,
            word_count: 300,
            confidence: 0.95,
            timestamp: "2024-05-01T10:00:00".to_string(),
        }
    }

    fn expect_submit(step: UploadStep) -> PreparedBatch {
        match step {
            UploadStep::Submit(batch) => batch,
            other => panic!("expected a batch to submit, got {:?}", other),
        }
    }

    #[test]
    fn validation_rejects_oversized_and_unsupported_files() {
        let big = CandidateFile::new(
            "big.pdf",
            None,
            Bytes::from(vec![0u8; (MAX_FILE_SIZE_BYTES + 1) as usize]),
        );
        let err = validate_batch(&[file("ok.pdf"), big]).unwrap_err();
        assert!(matches!(
            err,
            UploadError::Validation { ref file, reason: ValidationReason::TooLarge { .. } } if file == "big.pdf"
        ));

        let err = validate_batch(&[file("notes.docx")]).unwrap_err();
        assert_eq!(
            err,
            UploadError::Validation {
                file: "notes.docx".into(),
                reason: ValidationReason::UnsupportedType {
                    extension: Some("docx".into())
                },
            }
        );

        assert!(validate_batch(&[file("SCAN.TIFF"), file("a.jpeg"), file("b.png")]).is_ok());
    }

    #[test]
    fn exactly_ten_mebibytes_is_accepted() {
        let edge = CandidateFile::new(
            "edge.pdf",
            None,
            Bytes::from(vec![0u8; MAX_FILE_SIZE_BYTES as usize]),
        );
        assert!(validate_batch(&[edge]).is_ok());
    }

    #[test]
    fn partition_is_total_and_disjoint() {
        let existing = vec![doc("1", "a.pdf", "t"), doc("2", "B.pdf", "t")];
        let files = vec![file("a.pdf"), file("b.pdf"), file("c.pdf"), file("a.pdf")];

        let result = partition(files.clone(), &existing);
        assert_eq!(result.conflicts.len() + result.unique.len(), files.len());

        let conflicting: Vec<_> = result.conflicts.iter().map(|c| c.file.name.as_str()).collect();
        let unique: Vec<_> = result.unique.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(conflicting, vec!["a.pdf", "a.pdf"]);
        assert_eq!(unique, vec!["b.pdf", "c.pdf"]);
        assert!(result.conflicts.iter().all(|c| c.existing.id == "1"));
    }

    #[test]
    fn placeholders_exist_before_the_batch_is_sent() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.png")]).unwrap());
        assert_eq!(batch.files().len(), 2);
        assert_eq!(store.len(), 2);
        assert!(store
            .list_all()
            .iter()
            .all(|d| d.status == DocumentStatus::Processing && is_placeholder_id(&d.id)));
        assert!(uploads.is_in_flight());
        assert_eq!(store.session_timestamps().len(), 1);
    }

    #[test]
    fn successful_batch_replaces_placeholders_in_place() {
        let mut store = DocumentStore::new();
        store.add(doc("old", "first.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap());
        let confirmed = uploads
            .complete(
                &mut store,
                batch,
                Ok(vec![record("srv-a", "a.pdf"), record("srv-b", "b.pdf")]),
            )
            .unwrap();

        assert_eq!(confirmed.len(), 2);
        let ids: Vec<_> = store.list_all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "srv-a", "srv-b"]);
        let a = store.get("srv-a").unwrap();
        assert_eq!(a.status, DocumentStatus::Ready);
        assert_eq!(a.upload_timestamp, "2024-05-01T10:00:00");
        assert_eq!(a.meta.as_ref().unwrap().word_count, 300);
        assert_eq!(store.session_timestamps(), vec!["t0", "2024-05-01T10:00:00"]);
        assert!(!uploads.is_in_flight());
    }

    #[test]
    fn failed_batch_removes_every_placeholder() {
        let mut store = DocumentStore::new();
        store.add(doc("keep", "keep.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap());
        let placeholders = batch.placeholder_ids().to_vec();
        let err = uploads
            .complete(&mut store, batch, Err(PortError::Network("connection reset".into())))
            .unwrap_err();

        assert!(matches!(err, UploadError::Network(_)));
        assert_eq!(store.len(), 1);
        assert!(placeholders.iter().all(|id| store.get(id).is_none()));
        assert!(uploads.begin(&mut store, vec![]).is_ok());
    }

    #[test]
    fn abandoned_batch_reopens_the_gate() {
        let mut store = DocumentStore::new();
        store.add(doc("keep", "keep.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf")]).unwrap());
        let ticket = batch.ticket();
        drop(batch);

        assert!(uploads.abandon(&mut store, &ticket));
        assert_eq!(store.len(), 1);
        assert!(!uploads.is_in_flight());
        assert!(matches!(
            uploads.begin(&mut store, vec![file("b.pdf")]).unwrap(),
            UploadStep::Submit(_)
        ));
    }

    #[test]
    fn abandoning_a_completed_batch_changes_nothing() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf")]).unwrap());
        let ticket = batch.ticket();
        uploads
            .complete(&mut store, batch, Ok(vec![record("srv-a", "a.pdf")]))
            .unwrap();

        assert!(!uploads.abandon(&mut store, &ticket));
        assert!(store.get("srv-a").is_some());
    }

    #[test]
    fn mismatched_count_rolls_back() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap());
        let err = uploads
            .complete(&mut store, batch, Ok(vec![record("srv-a", "a.pdf")]))
            .unwrap_err();

        assert_eq!(err, UploadError::MismatchedResultCount { expected: 2, actual: 1 });
        assert!(store.is_empty());
    }

    #[test]
    fn colliding_backend_ids_roll_back_the_whole_batch() {
        let mut store = DocumentStore::new();
        store.add(doc("srv-a", "older.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap());
        let err = uploads
            .complete(
                &mut store,
                batch,
                Ok(vec![record("srv-b", "a.pdf"), record("srv-a", "b.pdf")]),
            )
            .unwrap_err();

        assert_eq!(err, UploadError::Store(StoreError::DuplicateId("srv-a".into())));
        let ids: Vec<_> = store.list_all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["srv-a"]);
    }

    #[test]
    fn skip_resolution_without_unique_files_sends_nothing() {
        let mut store = DocumentStore::new();
        store.add(doc("1", "a.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        let step = uploads.begin(&mut store, vec![file("a.pdf")]).unwrap();
        match step {
            UploadStep::NeedsResolution(conflicts) => {
                assert_eq!(
                    conflicts,
                    vec![ConflictNotice {
                        file_name: "a.pdf".into(),
                        existing_id: "1".into()
                    }]
                );
            }
            other => panic!("expected conflicts, got {:?}", other),
        }
        assert_eq!(uploads.begin(&mut store, vec![file("z.pdf")]).unwrap_err(), UploadError::ConflictPending);

        assert!(matches!(uploads.resolve(&mut store, false).unwrap(), UploadStep::Done));
        assert_eq!(store.list_all(), &[doc("1", "a.pdf", "t0")]);
        assert!(!uploads.is_pending_resolution());
    }

    #[test]
    fn skip_resolution_sends_only_unique_files() {
        let mut store = DocumentStore::new();
        store.add(doc("1", "a.pdf", "t0")).unwrap();
        let mut uploads = UploadCoordinator::new();

        uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap();
        let batch = expect_submit(uploads.resolve(&mut store, false).unwrap());
        let names: Vec<_> = batch.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf"]);
        assert!(store.get("1").is_some());
    }

    #[test]
    fn overwrite_removes_existing_and_merges_files() {
        let mut store = DocumentStore::new();
        store.add(doc("1", "a.pdf", "t0")).unwrap();
        store.add(doc("2", "other.pdf", "t0")).unwrap();
        store.toggle("1");
        let mut uploads = UploadCoordinator::new();

        uploads.begin(&mut store, vec![file("b.pdf"), file("a.pdf")]).unwrap();
        let batch = expect_submit(uploads.resolve(&mut store, true).unwrap());

        let names: Vec<_> = batch.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
        assert!(store.get("1").is_none());
        assert!(store.selected_ids().is_empty());
        assert_eq!(store.len(), 3);
        assert_eq!(uploads.begin(&mut store, vec![file("c.pdf")]).unwrap_err(), UploadError::BatchInFlight);
    }

    #[test]
    fn resolve_without_pending_batch_is_an_error() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();
        assert_eq!(
            uploads.resolve(&mut store, true).unwrap_err(),
            UploadError::NoPendingResolution
        );
    }

    #[test]
    fn validation_failure_leaves_store_untouched() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();
        let err = uploads
            .begin(&mut store, vec![file("a.pdf"), file("virus.exe")])
            .unwrap_err();
        assert!(matches!(err, UploadError::Validation { .. }));
        assert!(store.is_empty());
        assert!(!uploads.is_in_flight());
    }

    #[test]
    fn placeholder_deleted_mid_flight_is_not_resurrected() {
        let mut store = DocumentStore::new();
        let mut uploads = UploadCoordinator::new();

        let batch = expect_submit(uploads.begin(&mut store, vec![file("a.pdf"), file("b.pdf")]).unwrap());
        let first = batch.placeholder_ids()[0].clone();
        store.remove(&first);

        let confirmed = uploads
            .complete(
                &mut store,
                batch,
                Ok(vec![record("srv-a", "a.pdf"), record("srv-b", "b.pdf")]),
            )
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        let ids: Vec<_> = store.list_all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["srv-b"]);
    }
}
