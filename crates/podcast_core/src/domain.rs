//! crates/podcast_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use std::path::PathBuf;

/// Brand appended to every generated intro unless configured otherwise.
pub const DEFAULT_BRAND: &str = "PersonalPod";

/// A validated request to turn a report into a podcast episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastRequest {
    pub podcast_id: String,
    pub podcast_name: String,
    pub topic: String,
    pub report_text: String,
}

/// Describes the conversation the generator should produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationConfig {
    pub podcast_name: String,
    pub podcast_tagline: String,
    pub intro: Option<String>,
    pub output_language: String,
    pub conversation_style: Vec<String>,
    pub roles_person1: String,
    pub roles_person2: String,
    pub dialogue_structure: Vec<String>,
    pub engagement_techniques: Vec<String>,
    /// Sampling temperature handed to the transcript model, 0.0 to 1.0.
    pub creativity: f32,
    pub word_count: u32,
    pub user_instructions: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            podcast_name: "PODCASTFY".to_string(),
            podcast_tagline: "YOUR PERSONAL GenAI PODCAST".to_string(),
            intro: None,
            output_language: "English".to_string(),
            conversation_style: strings(&["engaging", "fast-paced", "enthusiastic"]),
            roles_person1: "main summarizer".to_string(),
            roles_person2: "questioner/clarifier".to_string(),
            dialogue_structure: strings(&["Introduction", "Main Content Summary", "Conclusion"]),
            engagement_techniques: strings(&[
                "rhetorical questions",
                "anecdotes",
                "analogies",
                "humor",
            ]),
            creativity: 1.0,
            word_count: 2000,
            user_instructions: String::new(),
        }
    }
}

impl ConversationConfig {
    /// Builds the conversation used for weekly report episodes.
    pub fn for_request(request: &PodcastRequest, brand: &str) -> Self {
        Self {
            podcast_name: request.podcast_name.clone(),
            intro: Some(format!("Welcome to {}, by {}.", request.podcast_name, brand)),
            conversation_style: strings(&["professional", "analytical", "concise"]),
            roles_person1: "market analyst".to_string(),
            roles_person2: "tech strategist".to_string(),
            ..Self::default()
        }
    }
}

/// One of the two hosts of a generated episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    Person1,
    Person2,
}

impl Speaker {
    /// The tag name used in transcripts.
    pub fn tag(&self) -> &'static str {
        match self {
            Speaker::Person1 => "Person1",
            Speaker::Person2 => "Person2",
        }
    }
}

/// A single line of dialogue in a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// The outcome of a successful generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastArtifact {
    pub podcast_id: String,
    pub public_url: String,
    pub audio_filename: String,
    pub text_file: PathBuf,
}
