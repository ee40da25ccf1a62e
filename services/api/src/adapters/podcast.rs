//! services/api/src/adapters/podcast.rs
//!
//! This module contains the podcast generator. It implements the
//! `PodcastGenerationService` port by chaining a transcript model with a
//! text-to-speech provider and writing the finished episode to disk.

use async_trait::async_trait;
use bytes::BytesMut;
use futures::{stream, StreamExt, TryStreamExt};
use podcast_core::{
    domain::ConversationConfig,
    ports::{
        PodcastGenerationService, PortError, PortResult, TextToSpeechService,
        TranscriptGenerationService,
    },
    transcript::{parse_transcript, render_transcript},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Generates two-host audio episodes from arbitrary text.
#[derive(Clone)]
pub struct ConversationPodcastGenerator {
    transcript: Arc<dyn TranscriptGenerationService>,
    tts: Arc<dyn TextToSpeechService>,
    audio_dir: PathBuf,
    transcripts_dir: PathBuf,
    concurrency: usize,
}

impl ConversationPodcastGenerator {
    /// Creates a generator writing into `{data_dir}/audio` and `{data_dir}/transcripts`.
    pub fn new(
        transcript: Arc<dyn TranscriptGenerationService>,
        tts: Arc<dyn TextToSpeechService>,
        data_dir: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Self {
        let data_dir = data_dir.into();
        Self {
            transcript,
            tts,
            audio_dir: data_dir.join("audio"),
            transcripts_dir: data_dir.join("transcripts"),
            concurrency: concurrency.max(1),
        }
    }
}

fn io_error(context: &str, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("{}: {}", context, e))
}

//=========================================================================================
// `PodcastGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PodcastGenerationService for ConversationPodcastGenerator {
    async fn generate_podcast(
        &self,
        content: &str,
        config: &ConversationConfig,
    ) -> PortResult<PathBuf> {
        let raw = self.transcript.generate_transcript(content, config).await?;
        let turns = parse_transcript(&raw)?;
        info!("Transcript ready with {} turns", turns.len());

        let episode_id = Uuid::new_v4().simple().to_string();
        tokio::fs::create_dir_all(&self.transcripts_dir)
            .await
            .map_err(|e| io_error("Failed to create transcripts folder", e))?;
        let transcript_path = self
            .transcripts_dir
            .join(format!("transcript_{}.txt", episode_id));
        tokio::fs::write(&transcript_path, render_transcript(&turns))
            .await
            .map_err(|e| io_error("Failed to save transcript", e))?;

        // `buffered` keeps segment order while bounding in-flight TTS calls.
        let segments: Vec<Vec<u8>> = stream::iter(turns.iter())
            .map(|turn| self.tts.generate_audio(&turn.text, turn.speaker))
            .buffered(self.concurrency)
            .boxed()
            .try_collect()
            .await?;

        // MP3 is a frame stream, so segments can be joined byte-for-byte.
        let mut audio = BytesMut::with_capacity(segments.iter().map(Vec::len).sum());
        for segment in &segments {
            audio.extend_from_slice(segment);
        }
        if audio.is_empty() {
            return Err(PortError::Unexpected(
                "TTS provider returned no audio".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.audio_dir)
            .await
            .map_err(|e| io_error("Failed to create audio folder", e))?;
        let audio_path = self.audio_dir.join(format!("podcast_{}.mp3", episode_id));
        tokio::fs::write(&audio_path, &audio)
            .await
            .map_err(|e| io_error("Failed to save podcast audio", e))?;

        info!("Podcast audio written to {}", audio_path.display());
        Ok(audio_path)
    }
}
