//! services/api/src/adapters/client.rs
//!
//! The shared HTTP client for the document analysis backend, plus the helpers
//! every backend adapter uses to turn responses into `PortResult`s.

use research_core::ports::{PortError, PortResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::error;

/// A configured `reqwest` client bound to the backend's base URL.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Joins `path` (which starts with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps a transport failure (connect, timeout, body read) to a port error.
pub(crate) fn transport_error(e: reqwest::Error) -> PortError {
    error!("Backend request failed: {:?}", e);
    PortError::Network(e.to_string())
}

/// Decodes a successful JSON body, or turns a non-2xx status into
/// `PortError::Rejected` using the body's `detail` field when it has one.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = rejection_detail(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        error!(status = status.as_u16(), detail = %detail, "Backend rejected the request.");
        return Err(PortError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        error!("Failed to decode backend response: {:?}", e);
        PortError::Unexpected(format!("Malformed backend response: {}", e))
    })
}

fn rejection_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Renders a page or paragraph number that the backend may send as a
/// string or as a number.
pub(crate) fn label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Timestamps travel as one comma-joined query parameter.
pub(crate) fn join_timestamps(timestamps: &[String]) -> String {
    timestamps.join(",")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::Router;
    use serde_json::json;

    /// Serves `router` on an ephemeral local port and returns a client for it.
    pub(crate) async fn fake_backend(router: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        BackendClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = BackendClient::new("http://backend:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("/api/themes"),
            "http://backend:8000/api/themes"
        );
    }

    #[test]
    fn labels_accept_strings_and_numbers() {
        assert_eq!(label(&json!("iv")), "iv");
        assert_eq!(label(&json!(3)), "3");
        assert_eq!(label(&json!(null)), "");
    }

    #[test]
    fn rejection_detail_prefers_the_detail_field() {
        assert_eq!(
            rejection_detail(r#"{"detail":"File too large"}"#).as_deref(),
            Some("File too large")
        );
        assert_eq!(
            rejection_detail(r#"{"detail":[{"msg":"field required"}]}"#).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
        assert_eq!(rejection_detail("<html>oops</html>"), None);
        assert_eq!(rejection_detail(r#"{"detail":"  "}"#), None);
    }
}
