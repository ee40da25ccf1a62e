//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        tts::parse_voice, ConversationPodcastGenerator, ElevenLabsTtsAdapter, LocalStorage,
        OpenAiTranscriptAdapter, OpenAiTtsAdapter, S3Storage,
    },
    config::{Config, StorageBackend, TtsProvider},
    error::ApiError,
    web::{router, state::AppState},
};
use async_openai::{config::OpenAIConfig, types::audio::SpeechModel, Client};
use podcast_core::ports::{ObjectStorageService, TextToSpeechService};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Transcript and TTS Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    let openai_client = Client::with_config(openai_config);

    let transcript_adapter = Arc::new(OpenAiTranscriptAdapter::new(
        openai_client.clone(),
        config.transcript_model.clone(),
    ));

    let tts_adapter: Arc<dyn TextToSpeechService> = match &config.tts_provider {
        TtsProvider::ElevenLabs { api_key } => {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
            info!("Using ElevenLabs TTS with model {}", config.elevenlabs_model);
            Arc::new(ElevenLabsTtsAdapter::new(
                http,
                config.elevenlabs_base_url.clone(),
                api_key.clone(),
                config.elevenlabs_model.clone(),
                config.elevenlabs_voices.clone(),
            ))
        }
        TtsProvider::OpenAi => {
            let (person1, person2) = &config.openai_tts_voices;
            let voice = |name: &String| {
                parse_voice(name).ok_or_else(|| {
                    ApiError::Internal(format!("Invalid TTS voice specified in config: '{}'", name))
                })
            };
            info!("Using OpenAI TTS");
            Arc::new(OpenAiTtsAdapter::new(
                openai_client.clone(),
                SpeechModel::Tts1Hd,
                voice(person1)?,
                voice(person2)?,
            ))
        }
    };

    let generator = Arc::new(ConversationPodcastGenerator::new(
        transcript_adapter,
        tts_adapter,
        config.output_dir.join("data"),
        config.tts_concurrency,
    ));

    // --- 3. Initialize Object Storage ---
    let storage: Arc<dyn ObjectStorageService> = match config.storage_backend {
        StorageBackend::S3 => {
            let aws_config = aws_config::load_from_env().await;
            info!("Publishing episodes to S3 bucket {}", config.s3_bucket);
            Arc::new(S3Storage::new(
                aws_sdk_s3::Client::new(&aws_config),
                config.s3_bucket.clone(),
            ))
        }
        StorageBackend::Local => {
            info!(
                "Publishing episodes to {}",
                config.local_storage_path.display()
            );
            Arc::new(LocalStorage::new(
                config.local_storage_path.clone(),
                config.public_base_url.clone(),
            ))
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        generator,
        storage,
    });

    // --- 5. Create the Web Router ---
    let app = router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
