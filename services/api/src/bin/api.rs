//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{BackendClient, HttpQueryAdapter, HttpThemeAdapter, HttpUploadAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use research_core::upload::MAX_FILE_SIZE_BYTES;
use std::{sync::Arc, time::Duration};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// How many maximum-size files one upload request may carry.
const MAX_FILES_PER_REQUEST: usize = 10;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Backend Adapters ---
    info!("Using analysis backend at {}", config.backend_url);
    let client = BackendClient::new(
        config.backend_url.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    let uploads = Arc::new(HttpUploadAdapter::new(client.clone()));
    let queries = Arc::new(HttpQueryAdapter::new(client.clone()));
    let themes = Arc::new(HttpThemeAdapter::new(client));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), uploads, queries, themes));

    // --- 4. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid CORS origin '{}': {}",
            config.cors_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let body_limit = MAX_FILE_SIZE_BYTES as usize * MAX_FILES_PER_REQUEST;
    let api_router = router(app_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
