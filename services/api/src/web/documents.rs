//! services/api/src/web/documents.rs
//!
//! Axum handlers for the document list: uploads with conflict resolution,
//! deletion, search and selection.

use crate::web::{
    render::{document_view, document_views},
    rest::{
        ConflictView, DocumentListResponse, ResolveRequest, SearchParams, UploadResponse,
    },
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use research_core::{
    domain::CandidateFile,
    store::DocumentStore,
    upload::{BatchTicket, ConflictNotice, UploadError, UploadStep},
};
use std::sync::Arc;
use tracing::{error, info, warn};

//=========================================================================================
// Helpers
//=========================================================================================

fn list_response(store: &DocumentStore, search: Option<&str>) -> DocumentListResponse {
    let documents = match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => document_views(store.search(term), store),
        None => document_views(store.list_all(), store),
    };
    DocumentListResponse {
        documents,
        total: store.len(),
        selected_count: store.selected_ids().len(),
        session_timestamps: store.session_timestamps(),
    }
}

fn conflict_views(notices: Vec<ConflictNotice>) -> Vec<ConflictView> {
    notices
        .into_iter()
        .map(|n| ConflictView {
            file_name: n.file_name,
            existing_id: n.existing_id,
        })
        .collect()
}

/// Maps an upload failure to the status the client sees. One message per batch.
fn upload_error(e: UploadError) -> (StatusCode, String) {
    let status = match &e {
        UploadError::Validation { .. } => StatusCode::BAD_REQUEST,
        UploadError::ConflictPending
        | UploadError::BatchInFlight
        | UploadError::NoPendingResolution => StatusCode::CONFLICT,
        UploadError::MismatchedResultCount { .. }
        | UploadError::Network(_)
        | UploadError::Store(_) => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        error!("Upload batch failed: {}", e);
    } else {
        warn!("Upload rejected: {}", e);
    }
    (status, e.to_string())
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<CandidateFile>, (StatusCode, String)> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        // Plain form fields carry no file.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read bytes of {}: {}", name, e),
            )
        })?;
        files.push(CandidateFile::new(name, mime_type, data));
    }
    Ok(files)
}

/// Undoes a sent batch when the request is dropped before its outcome is
/// reconciled, so no placeholder outlives the request and the gate reopens.
struct AbandonOnDrop {
    app_state: Arc<AppState>,
    ticket: Option<BatchTicket>,
}

impl AbandonOnDrop {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        warn!("Upload request dropped before its batch was reconciled.");
        if let Ok(mut session) = self.app_state.session.try_lock() {
            session.abandon_upload(&ticket);
            return;
        }
        // Someone else holds the session; finish the rollback once it is free.
        let app_state = self.app_state.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                app_state.session.lock().await.abandon_upload(&ticket);
            });
        } else {
            error!("No runtime to roll back a dropped upload batch.");
        }
    }
}

/// Carries a step from `begin`/`resolve` to its response. A `Submit` step is
/// sent to the backend with the session unlocked, then reconciled.
async fn drive_upload(
    app_state: &Arc<AppState>,
    step: UploadStep,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    match step {
        UploadStep::Done => Ok((StatusCode::OK, Json(UploadResponse::Skipped))),
        UploadStep::NeedsResolution(notices) => {
            info!(conflicts = notices.len(), "Upload waiting for conflict resolution.");
            Ok((
                StatusCode::ACCEPTED,
                Json(UploadResponse::NeedsResolution {
                    conflicts: conflict_views(notices),
                }),
            ))
        }
        UploadStep::Submit(batch) => {
            let mut guard = AbandonOnDrop {
                app_state: app_state.clone(),
                ticket: Some(batch.ticket()),
            };
            let outcome = app_state.uploads.upload_batch(batch.files()).await;

            let mut session = app_state.session.lock().await;
            guard.disarm();
            let confirmed = session
                .complete_upload(batch, outcome)
                .map_err(upload_error)?;
            let documents = confirmed
                .iter()
                .map(|d| document_view(d, session.documents.is_selected(&d.id)))
                .collect();
            Ok((
                StatusCode::CREATED,
                Json(UploadResponse::Uploaded { documents }),
            ))
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the session's documents, optionally filtered by name.
#[utoipa::path(
    get,
    path = "/documents",
    params(SearchParams),
    responses(
        (status = 200, description = "Documents in upload order", body = DocumentListResponse)
    )
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let session = app_state.session.lock().await;
    Json(list_response(&session.documents, params.search.as_deref()))
}

/// Upload a batch of documents.
///
/// Accepts a multipart/form-data request with one `files` part per document.
/// Files whose names already exist are held back until the conflict is resolved.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The documents to upload."),
    responses(
        (status = 200, description = "Nothing to upload", body = UploadResponse),
        (status = 201, description = "Batch uploaded and reconciled", body = UploadResponse),
        (status = 202, description = "Name conflicts need a decision", body = UploadResponse),
        (status = 400, description = "A file is too large or of an unsupported type"),
        (status = 409, description = "A conflict resolution or another batch is pending"),
        (status = 502, description = "The analysis backend failed")
    )
)]
pub async fn upload_documents_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let files = read_files(multipart).await?;
    info!(files = files.len(), "Received upload request.");

    let step = {
        let mut session = app_state.session.lock().await;
        session.begin_upload(files).map_err(upload_error)?
    };
    drive_upload(&app_state, step).await
}

/// Resolve pending name conflicts by overwriting or skipping.
#[utoipa::path(
    post,
    path = "/documents/resolve",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Nothing left to upload", body = UploadResponse),
        (status = 201, description = "Batch uploaded and reconciled", body = UploadResponse),
        (status = 409, description = "No conflict resolution is pending"),
        (status = 502, description = "The analysis backend failed")
    )
)]
pub async fn resolve_conflicts_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ResolveRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let step = {
        let mut session = app_state.session.lock().await;
        session
            .resolve_upload(request.overwrite)
            .map_err(upload_error)?
    };
    drive_upload(&app_state, step).await
}

/// Delete one document. Deleting an unknown id succeeds.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "The document id.")),
    responses((status = 204, description = "Document removed"))
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut session = app_state.session.lock().await;
    if session.documents.remove(&id).is_some() {
        info!(document = %id, "Document removed.");
    }
    StatusCode::NO_CONTENT
}

/// Flip the selection of one document.
#[utoipa::path(
    post,
    path = "/documents/selection/toggle/{id}",
    params(("id" = String, Path, description = "The document id.")),
    responses((status = 200, description = "Updated document list", body = DocumentListResponse))
)]
pub async fn toggle_selection_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut session = app_state.session.lock().await;
    session.documents.toggle(&id);
    Json(list_response(&session.documents, None))
}

/// Select every document.
#[utoipa::path(
    post,
    path = "/documents/selection/all",
    responses((status = 200, description = "Updated document list", body = DocumentListResponse))
)]
pub async fn select_all_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = app_state.session.lock().await;
    session.documents.select_all();
    Json(list_response(&session.documents, None))
}

/// Clear the selection.
#[utoipa::path(
    delete,
    path = "/documents/selection",
    responses((status = 200, description = "Updated document list", body = DocumentListResponse))
)]
pub async fn clear_selection_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = app_state.session.lock().await;
    session.documents.clear_selection();
    Json(list_response(&session.documents, None))
}

/// Delete every selected document.
#[utoipa::path(
    delete,
    path = "/documents/selected",
    responses((status = 200, description = "Remaining documents", body = DocumentListResponse))
)]
pub async fn delete_selected_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = app_state.session.lock().await;
    let removed = session.documents.remove_selected();
    info!(removed = removed.len(), "Selected documents removed.");
    Json(list_response(&session.documents, None))
}

#[cfg(test)]
mod tests {
    use crate::web::test_support::{app, delete, get, multipart_request, post_json, send, FakeBackend};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn upload_creates_ready_documents() {
        let backend = FakeBackend::new();
        let (router, _) = app(backend.clone());

        let (status, body) = send(
            &router,
            multipart_request("/documents", &[("report.pdf", "application/pdf", "%PDF")]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "uploaded");
        assert_eq!(body["documents"][0]["id"], "srv-report.pdf");
        assert_eq!(body["documents"][0]["status"], "ready");
        assert_eq!(body["documents"][0]["kind"], "application/pdf");

        let (status, list) = send(&router, get("/documents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 1);
        assert_eq!(list["session_timestamps"], json!(["batch-1"]));
    }

    #[tokio::test]
    async fn unsupported_files_are_rejected_before_any_call() {
        let backend = FakeBackend::new();
        let (router, _) = app(backend.clone());

        let (status, _) = send(
            &router,
            multipart_request(
                "/documents",
                &[("a.pdf", "application/pdf", "1"), ("notes.docx", "application/msword", "2")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);

        let (_, list) = send(&router, get("/documents")).await;
        assert_eq!(list["total"], 0);
    }

    #[tokio::test]
    async fn conflicts_wait_for_resolution() {
        let backend = FakeBackend::new();
        let (router, _) = app(backend.clone());
        let upload = || multipart_request("/documents", &[("a.pdf", "application/pdf", "1")]);

        send(&router, upload()).await;
        let (status, body) = send(&router, upload()).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "needs_resolution");
        assert_eq!(body["conflicts"][0]["file_name"], "a.pdf");

        // A second batch is refused while the first waits.
        let (status, _) = send(&router, upload()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) =
            send(&router, post_json("/documents/resolve", json!({ "overwrite": false }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "skipped");
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 1);

        let (status, _) =
            send(&router, post_json("/documents/resolve", json!({ "overwrite": true }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn backend_failure_rolls_back_placeholders() {
        let backend = FakeBackend::failing();
        let (router, state) = app(backend.clone());

        let (status, message) = send(
            &router,
            multipart_request("/documents", &[("a.pdf", "application/pdf", "1")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.as_str().unwrap().contains("disk full"));
        assert!(state.session.lock().await.documents.is_empty());
    }

    #[tokio::test]
    async fn dropped_upload_request_releases_its_batch() {
        let backend = FakeBackend::stalled();
        let (router, state) = app(backend.clone());
        let upload = || multipart_request("/documents", &[("a.pdf", "application/pdf", "1")]);

        let interrupted = timeout(Duration::from_millis(100), send(&router, upload())).await;
        assert!(interrupted.is_err());

        {
            let session = state.session.lock().await;
            assert!(session.documents.is_empty());
            assert!(!session.uploads.is_in_flight());
        }

        backend.stall_uploads.store(false, Ordering::SeqCst);
        let (status, body) = send(&router, upload()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["documents"][0]["id"], "srv-a.pdf");
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn selection_and_bulk_delete() {
        let backend = FakeBackend::new();
        let (router, _) = app(backend.clone());
        send(
            &router,
            multipart_request(
                "/documents",
                &[("a.pdf", "application/pdf", "1"), ("b.png", "image/png", "2")],
            ),
        )
        .await;

        let (_, list) = send(&router, post_json("/documents/selection/toggle/srv-a.pdf", json!({}))).await;
        assert_eq!(list["selected_count"], 1);
        assert_eq!(list["documents"][0]["selected"], true);

        let (_, list) = send(&router, post_json("/documents/selection/all", json!({}))).await;
        assert_eq!(list["selected_count"], 2);

        let (_, list) = send(&router, delete("/documents/selection")).await;
        assert_eq!(list["selected_count"], 0);

        send(&router, post_json("/documents/selection/toggle/srv-b.png", json!({}))).await;
        let (status, list) = send(&router, delete("/documents/selected")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 1);
        assert_eq!(list["documents"][0]["name"], "a.pdf");

        let (status, _) = send(&router, delete("/documents/srv-a.pdf")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&router, delete("/documents/srv-a.pdf")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn search_filters_by_name() {
        let backend = FakeBackend::new();
        let (router, _) = app(backend);
        send(
            &router,
            multipart_request(
                "/documents",
                &[("Annual-Report.pdf", "application/pdf", "1"), ("scan.tiff", "image/tiff", "2")],
            ),
        )
        .await;

        let (_, list) = send(&router, get("/documents?search=report")).await;
        assert_eq!(list["documents"].as_array().unwrap().len(), 1);
        assert_eq!(list["documents"][0]["name"], "Annual-Report.pdf");
        assert_eq!(list["total"], 2);
    }
}
