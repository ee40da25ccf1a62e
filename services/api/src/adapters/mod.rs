pub mod elevenlabs;
pub mod podcast;
pub mod storage;
pub mod transcript_llm;
pub mod tts;

pub use elevenlabs::ElevenLabsTtsAdapter;
pub use podcast::ConversationPodcastGenerator;
pub use storage::{LocalStorage, S3Storage};
pub use transcript_llm::OpenAiTranscriptAdapter;
pub use tts::OpenAiTtsAdapter;
