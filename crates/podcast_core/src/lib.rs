pub mod domain;
pub mod ports;
pub mod text;
pub mod transcript;

pub use domain::{ConversationConfig, DialogueTurn, PodcastArtifact, PodcastRequest, Speaker};
pub use ports::{
    ObjectStorageService, PodcastGenerationService, PortError, PortResult, TextToSpeechService,
    TranscriptGenerationService,
};
