use api_lib::{
    adapters::{LocalStorage, S3Storage},
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use podcast_core::{
    domain::ConversationConfig,
    ports::{ObjectStorageService, PodcastGenerationService, PortError, PortResult},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

/// What the fake generator should do when called.
#[derive(Clone)]
pub enum GeneratorBehavior {
    /// Writes an MP3 file outside of the podcasts folder.
    WriteFile,
    /// Reports a path that was never written.
    MissingFile,
    Fail(&'static str),
}

/// A stand-in for the transcript + TTS pipeline.
pub struct FakeGenerator {
    behavior: GeneratorBehavior,
    scratch_dir: PathBuf,
    pub calls: Mutex<Vec<(String, ConversationConfig)>>,
}

impl FakeGenerator {
    pub fn new(behavior: GeneratorBehavior, output_dir: &Path) -> Self {
        Self {
            behavior,
            scratch_dir: output_dir.join("data").join("audio"),
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// Builds a configuration rooted at `output_dir`, with `extra` overriding defaults.
pub fn test_config(output_dir: &Path, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OUTPUT_DIR".to_string(), output_dir.display().to_string()),
        ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ("ELEVENLABS_API_KEY".to_string(), "xi-test".to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test configuration")
}

/// Builds a router that publishes through `LocalStorage` into `{output_dir}/public`.
pub fn local_storage_router(behavior: GeneratorBehavior, output_dir: &Path) -> Router {
    let public_dir = output_dir.join("public");
    let public_dir_str = public_dir.display().to_string();
    let config = test_config(
        output_dir,
        &[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", public_dir_str.as_str()),
            ("PUBLIC_BASE_URL", "http://localhost:5000/public"),
        ],
    );
    let state = Arc::new(AppState {
        storage: Arc::new(LocalStorage::new(
            config.local_storage_path.clone(),
            config.public_base_url.clone(),
        )),
        config: Arc::new(config),
        generator: Arc::new(FakeGenerator::new(behavior, output_dir)),
    });
    router(state)
}

#[async_trait]
impl PodcastGenerationService for FakeGenerator {
    async fn generate_podcast(
        &self,
        content: &str,
        config: &ConversationConfig,
    ) -> PortResult<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push((content.to_string(), config.clone()));

        let path = self.scratch_dir.join("podcast_0123abcd.mp3");
        match &self.behavior {
            GeneratorBehavior::WriteFile => {
                tokio::fs::create_dir_all(&self.scratch_dir).await.unwrap();
                tokio::fs::write(&path, b"ID3fake-mp3").await.unwrap();
                Ok(path)
            }
            GeneratorBehavior::MissingFile => Ok(path),
            GeneratorBehavior::Fail(msg) => Err(PortError::Unexpected(msg.to_string())),
        }
    }
}

/// Records uploads and answers with the URL S3 would serve them from.
#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<(String, Vec<u8>, String)>>,
}

#[async_trait]
impl ObjectStorageService for FakeStorage {
    async fn upload_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> PortResult<String> {
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), data, content_type.to_string()));
        Ok(S3Storage::public_url("personal-pod", key))
    }
}

pub struct TestApp {
    pub router: Router,
    pub generator: Arc<FakeGenerator>,
    pub storage: Arc<FakeStorage>,
    pub output_dir: TempDir,
}

impl TestApp {
    pub fn spawn(behavior: GeneratorBehavior) -> Self {
        Self::spawn_with(behavior, &[])
    }

    pub fn spawn_with(behavior: GeneratorBehavior, extra: &[(&str, &str)]) -> Self {
        let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(output_dir.path(), extra);

        let generator = Arc::new(FakeGenerator::new(behavior, output_dir.path()));
        let storage = Arc::new(FakeStorage::default());
        let state = Arc::new(AppState {
            config: Arc::new(config),
            generator: generator.clone(),
            storage: storage.clone(),
        });

        TestApp {
            router: router(state),
            generator,
            storage,
            output_dir,
        }
    }

    /// Sends a raw body to `POST /generate-podcast` and returns status and JSON.
    pub async fn generate(&self, body: impl Into<String>) -> (StatusCode, serde_json::Value) {
        generate(&self.router, body).await
    }
}

pub async fn generate(
    router: &Router,
    body: impl Into<String>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/generate-podcast")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).expect("Response body was not JSON");
    (status, json)
}
