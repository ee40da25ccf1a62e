//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which text-to-speech provider voices the generated dialogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    ElevenLabs { api_key: String },
    OpenAi,
}

/// Where finished episodes are published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub output_dir: PathBuf,
    pub podcast_brand: String,
    pub max_body_bytes: usize,
    pub cors_allow_origin: Option<String>,
    pub openai_api_key: String,
    pub transcript_model: String,
    pub tts_provider: TtsProvider,
    pub tts_concurrency: usize,
    pub elevenlabs_base_url: String,
    pub elevenlabs_model: String,
    pub elevenlabs_voices: (String, String),
    pub openai_tts_voices: (String, String),
    pub storage_backend: StorageBackend,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub local_storage_path: PathBuf,
    pub public_base_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:5000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let output_dir = PathBuf::from(var_or("OUTPUT_DIR", "/tmp/output"));
        let podcast_brand = var_or("PODCAST_BRAND", podcast_core::domain::DEFAULT_BRAND);
        let max_body_bytes = parse_number(&lookup, "MAX_BODY_BYTES", 10 * 1024 * 1024)?;
        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN");

        // --- Transcript and TTS Settings ---
        let openai_api_key = required("OPENAI_API_KEY")?;
        let transcript_model = var_or("TRANSCRIPT_MODEL", "gpt-4o-mini");

        let tts_provider = match var_or("TTS_PROVIDER", "elevenlabs").to_lowercase().as_str() {
            "elevenlabs" => TtsProvider::ElevenLabs {
                api_key: required("ELEVENLABS_API_KEY")?,
            },
            "openai" => TtsProvider::OpenAi,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TTS_PROVIDER".to_string(),
                    format!("'{}' is not one of elevenlabs, openai", other),
                ))
            }
        };
        let tts_concurrency = parse_number(&lookup, "TTS_CONCURRENCY", 2)?.max(1);

        let elevenlabs_base_url = var_or("ELEVENLABS_BASE_URL", "https://api.elevenlabs.io");
        let elevenlabs_model = var_or("ELEVENLABS_MODEL", "eleven_multilingual_v2");
        let elevenlabs_voices = (
            var_or("ELEVENLABS_VOICE_PERSON1", "iP95p4xoKVk53GoZ742B"),
            var_or("ELEVENLABS_VOICE_PERSON2", "cgSgspJ2msm6clMCkdW9"),
        );
        let openai_tts_voices = (
            var_or("OPENAI_TTS_VOICE_PERSON1", "echo"),
            var_or("OPENAI_TTS_VOICE_PERSON2", "shimmer"),
        );

        // --- Storage Settings ---
        let storage_backend = match var_or("STORAGE_BACKEND", "s3").to_lowercase().as_str() {
            "s3" => StorageBackend::S3,
            "local" => StorageBackend::Local,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE_BACKEND".to_string(),
                    format!("'{}' is not one of s3, local", other),
                ))
            }
        };
        let s3_bucket = var_or("S3_BUCKET", "personal-pod");
        let s3_prefix = var_or("S3_PREFIX", "generated-podcasts/");
        let local_storage_path = PathBuf::from(var_or("LOCAL_STORAGE_PATH", "/tmp/output/public"));
        let public_base_url = var_or("PUBLIC_BASE_URL", "http://localhost:5000/public");

        Ok(Self {
            bind_address,
            log_level,
            output_dir,
            podcast_brand,
            max_body_bytes,
            cors_allow_origin,
            openai_api_key,
            transcript_model,
            tts_provider,
            tts_concurrency,
            elevenlabs_base_url,
            elevenlabs_model,
            elevenlabs_voices,
            openai_tts_voices,
            storage_backend,
            s3_bucket,
            s3_prefix,
            local_storage_path,
            public_base_url,
        })
    }

    /// The folder finished episodes and their content files are kept in.
    pub fn podcasts_dir(&self) -> PathBuf {
        self.output_dir.join("podcasts")
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Loads with the required keys present; `vars` may override or blank them.
    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut map: HashMap<String, String> = HashMap::from([
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
            ("ELEVENLABS_API_KEY".to_string(), "xi-test".to_string()),
        ]);
        for (k, v) in vars {
            map.insert(k.to_string(), v.to_string());
        }
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_production_setup() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_address.port(), 5000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.podcasts_dir(), PathBuf::from("/tmp/output/podcasts"));
        assert_eq!(config.podcast_brand, "PersonalPod");
        assert_eq!(
            config.tts_provider,
            TtsProvider::ElevenLabs {
                api_key: "xi-test".to_string()
            }
        );
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.s3_bucket, "personal-pod");
        assert_eq!(config.s3_prefix, "generated-podcasts/");
        assert_eq!(config.tts_concurrency, 2);
        assert_eq!(config.openai_api_key, "sk-test");
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("TTS_PROVIDER", "OpenAI"),
            ("STORAGE_BACKEND", "local"),
            ("OUTPUT_DIR", "/var/podcasts"),
            ("TTS_CONCURRENCY", "0"),
            ("OPENAI_API_KEY", "sk-other"),
        ])
        .unwrap();

        assert_eq!(config.tts_provider, TtsProvider::OpenAi);
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(config.podcasts_dir(), PathBuf::from("/var/podcasts/podcasts"));
        assert_eq!(config.tts_concurrency, 1);
        assert_eq!(config.openai_api_key, "sk-other");
    }

    #[test]
    fn required_keys_are_reported_as_missing() {
        assert!(matches!(
            load(&[("OPENAI_API_KEY", "")]),
            Err(ConfigError::MissingVar(var)) if var == "OPENAI_API_KEY"
        ));
        assert!(matches!(
            load(&[("ELEVENLABS_API_KEY", "  ")]),
            Err(ConfigError::MissingVar(var)) if var == "ELEVENLABS_API_KEY"
        ));
        // The ElevenLabs key is only needed when ElevenLabs is the provider.
        let config = load(&[("TTS_PROVIDER", "openai"), ("ELEVENLABS_API_KEY", "")]).unwrap();
        assert_eq!(config.tts_provider, TtsProvider::OpenAi);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("BIND_ADDRESS", "not-an-address")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "BIND_ADDRESS"
        ));
        assert!(matches!(
            load(&[("TTS_PROVIDER", "polly")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "TTS_PROVIDER"
        ));
        assert!(matches!(
            load(&[("MAX_BODY_BYTES", "lots")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "MAX_BODY_BYTES"
        ));
    }
}
