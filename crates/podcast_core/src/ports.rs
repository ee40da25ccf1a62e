//! crates/podcast_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like LLMs, TTS
//! providers or object stores.

use async_trait::async_trait;
use std::path::PathBuf;
use crate::domain::{ConversationConfig, Speaker};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TranscriptGenerationService: Send + Sync {
    /// Writes a two-speaker transcript, tagged with `<Person1>`/`<Person2>`,
    /// discussing the given content.
    async fn generate_transcript(
        &self,
        content: &str,
        config: &ConversationConfig,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates MP3 audio for one line spoken by `speaker`.
    async fn generate_audio(&self, text: &str, speaker: Speaker) -> PortResult<Vec<u8>>;
}

#[async_trait]
pub trait PodcastGenerationService: Send + Sync {
    /// Produces an audio episode from the content and returns the path of the
    /// file it wrote. The file may live anywhere on the local filesystem.
    async fn generate_podcast(
        &self,
        content: &str,
        config: &ConversationConfig,
    ) -> PortResult<PathBuf>;
}

#[async_trait]
pub trait ObjectStorageService: Send + Sync {
    /// Stores `data` under `key` with public-read visibility and returns the
    /// URL the object can be fetched from.
    async fn upload_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> PortResult<String>;
}
