//! services/api/src/web/podcast_task.rs
//!
//! This module contains the pipeline behind a generation request: write the
//! content file, run the generator, collect its output and publish it.

use crate::web::state::AppState;
use chrono::Local;
use podcast_core::{
    domain::{ConversationConfig, PodcastArtifact, PodcastRequest},
    ports::PortError,
    text::structured_content,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Failures that can occur after a request has been validated.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The generator finished without leaving an audio file behind.
    #[error("Podcast generation failed")]
    GenerationFailed,

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Port(#[from] PortError),
}

impl JobError {
    /// A short, stable name for the failure, reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::GenerationFailed => "GenerationFailed",
            JobError::Io { .. } => "IoError",
            JobError::Port(PortError::NotFound(_)) => "NotFound",
            JobError::Port(PortError::Unauthorized) => "Unauthorized",
            JobError::Port(PortError::Unexpected(_)) => "PortError",
        }
    }
}

fn io_error(context: &'static str) -> impl FnOnce(std::io::Error) -> JobError {
    move |source| JobError::Io { context, source }
}

/// Makes a client-supplied id usable inside file names and object keys.
fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Runs the full generation pipeline for one validated request.
pub async fn generate_podcast_job(
    app_state: &AppState,
    request: &PodcastRequest,
) -> Result<PodcastArtifact, JobError> {
    let config = &app_state.config;
    let podcasts_dir = config.podcasts_dir();
    fs::create_dir_all(&podcasts_dir)
        .await
        .map_err(io_error("Failed to create podcasts folder"))?;

    let now = Local::now();
    let safe_id = file_safe(&request.podcast_id);
    let content = structured_content(request, now.date_naive());
    debug!("Structured content for podcast:\n{}", content);

    let content_path = podcasts_dir.join(format!(
        "podcast_content_{}_{}.txt",
        safe_id,
        now.format("%Y%m%d_%H%M%S")
    ));
    fs::write(&content_path, &content)
        .await
        .map_err(io_error("Failed to write podcast content"))?;

    let conversation = ConversationConfig::for_request(request, &config.podcast_brand);
    info!("Starting podcast generation...");
    let generated = app_state
        .generator
        .generate_podcast(&content, &conversation)
        .await?;
    info!("Generator returned: {}", generated.display());

    let audio_path = collect_output(generated, &podcasts_dir).await?;
    info!("Audio file generated at: {}", audio_path.display());

    let file_name = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or(JobError::GenerationFailed)?;
    let audio_filename = format!("{}_{}", safe_id, file_name);
    let key = format!("{}{}", config.s3_prefix, audio_filename);

    let audio = fs::read(&audio_path)
        .await
        .map_err(io_error("Failed to read podcast audio"))?;
    let public_url = app_state
        .storage
        .upload_public(&key, audio, AUDIO_CONTENT_TYPE)
        .await?;
    info!("Podcast uploaded at: {}", public_url);

    Ok(PodcastArtifact {
        podcast_id: request.podcast_id.clone(),
        public_url,
        audio_filename,
        text_file: content_path,
    })
}

/// Ensures the generated file exists and lives in the podcasts folder.
async fn collect_output(generated: PathBuf, podcasts_dir: &Path) -> Result<PathBuf, JobError> {
    if !fs::try_exists(&generated).await.unwrap_or(false) {
        error!("Failed to generate podcast audio file");
        return Err(JobError::GenerationFailed);
    }
    if generated.starts_with(podcasts_dir) {
        return Ok(generated);
    }

    let file_name = generated.file_name().ok_or(JobError::GenerationFailed)?;
    let target = podcasts_dir.join(file_name);
    if let Err(e) = fs::rename(&generated, &target).await {
        // Rename cannot cross filesystems.
        warn!("Rename into podcasts folder failed ({}), copying instead", e);
        fs::copy(&generated, &target)
            .await
            .map_err(io_error("Failed to move podcast audio"))?;
        fs::remove_file(&generated)
            .await
            .map_err(io_error("Failed to remove generated audio"))?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_safe_replaces_path_characters() {
        assert_eq!(file_safe("show-42_a"), "show-42_a");
        assert_eq!(file_safe("../../etc"), "______etc");
        assert_eq!(file_safe("a b/c"), "a_b_c");
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(JobError::GenerationFailed.kind(), "GenerationFailed");
        assert_eq!(JobError::Port(PortError::Unauthorized).kind(), "Unauthorized");
        assert_eq!(
            JobError::Port(PortError::Unexpected("boom".to_string())).kind(),
            "PortError"
        );
    }

    #[tokio::test]
    async fn output_is_moved_into_the_podcasts_folder() {
        let dir = tempfile::tempdir().unwrap();
        let podcasts = dir.path().join("podcasts");
        std::fs::create_dir_all(&podcasts).unwrap();
        let generated = dir.path().join("podcast_x.mp3");
        std::fs::write(&generated, b"mp3").unwrap();

        let collected = collect_output(generated.clone(), &podcasts).await.unwrap();

        assert_eq!(collected, podcasts.join("podcast_x.mp3"));
        assert!(collected.exists());
        assert!(!generated.exists());
    }

    #[tokio::test]
    async fn output_already_in_place_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let generated = dir.path().join("podcast_y.mp3");
        std::fs::write(&generated, b"mp3").unwrap();

        let collected = collect_output(generated.clone(), dir.path()).await.unwrap();

        assert_eq!(collected, generated);
    }

    #[tokio::test]
    async fn missing_output_is_a_generation_failure() {
        let dir = tempfile::tempdir().unwrap();

        let err = collect_output(dir.path().join("nope.mp3"), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::GenerationFailed));
    }
}
