//! services/api/src/adapters/themes.rs
//!
//! Adapter for the backend's theme identification endpoint.

use crate::adapters::client::{join_timestamps, read_json, transport_error, BackendClient};
use async_trait::async_trait;
use research_core::{
    domain::Theme,
    ports::{PortResult, ThemeService},
};
use serde::Deserialize;

const THEMES_PATH: &str = "/api/themes";

#[derive(Deserialize, Debug)]
struct ThemeRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    documents: Vec<String>,
}

impl ThemeRecord {
    fn to_domain(self) -> Theme {
        Theme {
            id: self.id,
            title: self.title,
            description: self.description,
            document_ids: self.documents,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ThemesRecord {
    #[serde(default)]
    themes: Vec<ThemeRecord>,
}

#[derive(Clone)]
pub struct HttpThemeAdapter {
    client: BackendClient,
}

impl HttpThemeAdapter {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ThemeService for HttpThemeAdapter {
    async fn identify_themes(&self, timestamps: &[String]) -> PortResult<Vec<Theme>> {
        let scope = join_timestamps(timestamps);
        let response = self
            .client
            .http()
            .get(self.client.url(THEMES_PATH))
            .query(&[("timestamp", scope.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let record: ThemesRecord = read_json(response).await?;
        Ok(record.themes.into_iter().map(ThemeRecord::to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::client::tests::fake_backend;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use research_core::ports::PortError;
    use serde_json::json;

    #[tokio::test]
    async fn maps_theme_documents() {
        let router = Router::new().route(
            THEMES_PATH,
            get(|| async {
                Json(json!({ "themes": [{
                    "id": "th1",
                    "title": "Growth",
                    "description": "Revenue trends",
                    "documents": ["d1", "d2"]
                }]}))
            }),
        );
        let adapter = HttpThemeAdapter::new(fake_backend(router).await);

        let themes = adapter.identify_themes(&["t1".to_string()]).await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].title, "Growth");
        assert_eq!(themes[0].document_ids, vec!["d1", "d2"]);
    }

    #[tokio::test]
    async fn server_errors_fall_back_to_the_status_reason() {
        let router = Router::new().route(
            THEMES_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let adapter = HttpThemeAdapter::new(fake_backend(router).await);

        let err = adapter.identify_themes(&[]).await.unwrap_err();
        assert_eq!(
            err,
            PortError::Rejected {
                status: 500,
                detail: "Internal Server Error".into()
            }
        );
    }
}
