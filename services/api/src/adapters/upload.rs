//! services/api/src/adapters/upload.rs
//!
//! This module contains the adapter for the backend's document upload endpoint.
//! It implements the `UploadService` port from the `core` crate.

use crate::adapters::client::{read_json, transport_error, BackendClient};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use research_core::{
    domain::{CandidateFile, UploadedDocument},
    ports::{PortError, PortResult, UploadService},
};
use serde::Deserialize;
use tracing::{error, info};

const UPLOAD_PATH: &str = "/api/documents/upload";

/// One processed file as the backend reports it.
#[derive(Deserialize, Debug)]
struct UploadRecord {
    document_id: String,
    filename: String,
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    word_count: u64,
    #[serde(default)]
    confidence: f32,
    timestamp: String,
}

impl UploadRecord {
    fn to_domain(self) -> UploadedDocument {
        UploadedDocument {
            document_id: self.document_id,
            filename: self.filename,
            pages: self.pages,
            word_count: self.word_count,
            confidence: self.confidence,
            timestamp: self.timestamp,
        }
    }
}

/// Older backends wrap the list in a `documents` field.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum UploadResponse {
    List(Vec<UploadRecord>),
    Wrapped { documents: Vec<UploadRecord> },
}

impl UploadResponse {
    fn into_records(self) -> Vec<UploadRecord> {
        match self {
            UploadResponse::List(records) => records,
            UploadResponse::Wrapped { documents } => documents,
        }
    }
}

#[derive(Clone)]
pub struct HttpUploadAdapter {
    client: BackendClient,
}

impl HttpUploadAdapter {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadService for HttpUploadAdapter {
    async fn upload_batch(&self, files: &[CandidateFile]) -> PortResult<Vec<UploadedDocument>> {
        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.data.to_vec()).file_name(file.name.clone());
            if let Some(mime) = file.mime_type.as_deref() {
                part = part.mime_str(mime).map_err(|e| {
                    error!("Invalid MIME type '{}' for {}: {:?}", mime, file.name, e);
                    PortError::Unexpected(format!("Invalid MIME type for {}", file.name))
                })?;
            }
            form = form.part("files", part);
        }

        info!(files = files.len(), "Uploading batch to backend.");
        let response = self
            .client
            .http()
            .post(self.client.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let records = read_json::<UploadResponse>(response).await?.into_records();
        Ok(records.into_iter().map(UploadRecord::to_domain).collect())
    }
}
