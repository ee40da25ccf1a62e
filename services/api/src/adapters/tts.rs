//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapter for OpenAI's Text-to-Speech (TTS) service.
//! It implements the `TextToSpeechService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::audio::{CreateSpeechRequest, SpeechModel, Voice},
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use podcast_core::{
    domain::Speaker,
    ports::{PortError, PortResult, TextToSpeechService},
};

/// Maps a configured voice name onto the OpenAI voice enum.
pub fn parse_voice(name: &str) -> Option<Voice> {
    match name.to_lowercase().as_str() {
        "alloy" => Some(Voice::Alloy),
        "echo" => Some(Voice::Echo),
        "fable" => Some(Voice::Fable),
        "onyx" => Some(Voice::Onyx),
        "nova" => Some(Voice::Nova),
        "shimmer" => Some(Voice::Shimmer),
        _ => None,
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the OpenAI TTS API.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    person1_voice: Voice,
    person2_voice: Voice,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter` with one voice per host.
    pub fn new(
        client: Client<OpenAIConfig>,
        model: SpeechModel,
        person1_voice: Voice,
        person2_voice: Voice,
    ) -> Self {
        Self {
            client,
            model,
            person1_voice,
            person2_voice,
        }
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for OpenAiTtsAdapter {
    /// Generates MP3 audio (`Vec<u8>`) for the given line of dialogue.
    async fn generate_audio(&self, text: &str, speaker: Speaker) -> PortResult<Vec<u8>> {
        let voice = match speaker {
            Speaker::Person1 => self.person1_voice.clone(),
            Speaker::Person2 => self.person2_voice.clone(),
        };
        let request = CreateSpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice,
            ..Default::default()
        };

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .speech()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        Ok(response.bytes.to_vec())
    }
}
