//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use research_core::{
    ports::{QueryService, ThemeService, UploadService},
    ResearchSession,
};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The research session is locked only for synchronous state changes. Backend
/// calls run with the lock released, so hover and selection traffic is never
/// blocked behind an upload.
pub struct AppState {
    pub session: Mutex<ResearchSession>,
    pub config: Arc<Config>,
    pub uploads: Arc<dyn UploadService>,
    pub queries: Arc<dyn QueryService>,
    pub themes: Arc<dyn ThemeService>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        uploads: Arc<dyn UploadService>,
        queries: Arc<dyn QueryService>,
        themes: Arc<dyn ThemeService>,
    ) -> Self {
        Self {
            session: Mutex::new(ResearchSession::new()),
            config,
            uploads,
            queries,
            themes,
        }
    }
}
