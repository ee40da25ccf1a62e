//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use podcast_core::ports::{ObjectStorageService, PodcastGenerationService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn PodcastGenerationService>,
    pub storage: Arc<dyn ObjectStorageService>,
}
