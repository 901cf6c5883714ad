//! services/api/src/adapters/query.rs
//!
//! Adapter for the backend's cross-document query endpoint.

use crate::adapters::client::{join_timestamps, label, read_json, transport_error, BackendClient};
use async_trait::async_trait;
use research_core::{
    domain::{Citation, DocumentAnswer, QueryAnswer},
    ports::{PortResult, QueryService},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

const QUERY_PATH: &str = "/api/query/query_documents";

#[derive(Deserialize, Debug)]
struct CitationRecord {
    #[serde(default)]
    page: Value,
    #[serde(default)]
    paragraph: Value,
    #[serde(default)]
    full_citation: String,
}

impl CitationRecord {
    fn to_domain(self) -> Citation {
        Citation {
            page: label(&self.page),
            paragraph: label(&self.paragraph),
            full_citation_text: self.full_citation,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ResultRecord {
    doc_id: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    citations: Vec<CitationRecord>,
}

impl ResultRecord {
    fn to_domain(self) -> DocumentAnswer {
        DocumentAnswer {
            doc_id: self.doc_id,
            response: self.response,
            citations: self
                .citations
                .into_iter()
                .map(CitationRecord::to_domain)
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct QueryRecord {
    #[serde(default)]
    combined_answer: String,
    #[serde(default)]
    results: Vec<ResultRecord>,
}

#[derive(Clone)]
pub struct HttpQueryAdapter {
    client: BackendClient,
}

impl HttpQueryAdapter {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryService for HttpQueryAdapter {
    async fn query_documents(&self, query: &str, timestamps: &[String]) -> PortResult<QueryAnswer> {
        let scope = join_timestamps(timestamps);
        let response = self
            .client
            .http()
            .get(self.client.url(QUERY_PATH))
            .query(&[("q", query), ("timestamp", scope.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let record: QueryRecord = read_json(response).await?;
        info!(results = record.results.len(), "Received query results.");
        Ok(QueryAnswer {
            combined_answer: record.combined_answer,
            results: record
                .results
                .into_iter()
                .map(ResultRecord::to_domain)
                .collect(),
        })
    }
}
