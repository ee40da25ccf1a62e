//! services/api/src/adapters/elevenlabs.rs
//!
//! This module contains the adapter for the ElevenLabs Text-to-Speech service.
//! It implements the `TextToSpeechService` port from the `core` crate.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use podcast_core::{
    domain::Speaker,
    ports::{PortError, PortResult, TextToSpeechService},
};
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Request body for `POST /v1/text-to-speech/{voice_id}`.
#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the ElevenLabs API.
///
/// Rate limiting (429) and server errors are retried with exponential backoff,
/// honouring a numeric `Retry-After` header when one is sent.
#[derive(Clone)]
pub struct ElevenLabsTtsAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    person1_voice: String,
    person2_voice: String,
    retry_initial: Duration,
    retry_max_elapsed: Duration,
}

impl ElevenLabsTtsAdapter {
    /// Creates a new `ElevenLabsTtsAdapter`; the voices are ElevenLabs voice IDs.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voices: (String, String),
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            person1_voice: voices.0,
            person2_voice: voices.1,
            retry_initial: Duration::from_millis(500),
            retry_max_elapsed: Duration::from_secs(60),
        }
    }

    /// Overrides the retry schedule for transient failures.
    pub fn with_retry(mut self, initial: Duration, max_elapsed: Duration) -> Self {
        self.retry_initial = initial;
        self.retry_max_elapsed = max_elapsed;
        self
    }

    fn speech_url(&self, speaker: Speaker) -> String {
        let voice = match speaker {
            Speaker::Person1 => &self.person1_voice,
            Speaker::Person2 => &self.person2_voice,
        };
        format!("{}/v1/text-to-speech/{}", self.base_url, voice)
    }

    async fn request_once(
        &self,
        url: &str,
        text: &str,
    ) -> Result<Vec<u8>, backoff::Error<PortError>> {
        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model,
            })
            .send()
            .await
            .map_err(|e| {
                backoff::Error::transient(PortError::Unexpected(format!(
                    "ElevenLabs request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(backoff::Error::permanent(PortError::Unauthorized));
        }
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            let err = PortError::Unexpected(format!("ElevenLabs returned {}: {}", status, body));

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!("ElevenLabs returned {}, retrying", status);
                return Err(match retry_after {
                    Some(wait) => backoff::Error::retry_after(err, wait),
                    None => backoff::Error::transient(err),
                });
            }
            return Err(backoff::Error::permanent(err));
        }

        let audio = response.bytes().await.map_err(|e| {
            backoff::Error::transient(PortError::Unexpected(format!(
                "Failed to read ElevenLabs audio: {}",
                e
            )))
        })?;
        Ok(audio.to_vec())
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for ElevenLabsTtsAdapter {
    /// Generates MP3 audio for one line of dialogue in the speaker's voice.
    async fn generate_audio(&self, text: &str, speaker: Speaker) -> PortResult<Vec<u8>> {
        let url = self.speech_url(speaker);
        debug!(speaker = speaker.tag(), chars = text.len(), "Requesting ElevenLabs speech");

        let backoff = ExponentialBackoff {
            initial_interval: self.retry_initial,
            max_elapsed_time: Some(self.retry_max_elapsed),
            ..Default::default()
        };
        retry(backoff, || self.request_once(&url, text)).await
    }
}
