//! services/api/src/adapters/transcript_llm.rs
//!
//! This module contains the adapter for the transcript-writing LLM.
//! It implements the `TranscriptGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use podcast_core::{
    domain::ConversationConfig,
    ports::{PortError, PortResult, TranscriptGenerationService},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TranscriptGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTranscriptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTranscriptAdapter {
    /// Creates a new `OpenAiTranscriptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Builds the system instructions describing the show and its hosts.
pub fn system_prompt(config: &ConversationConfig) -> String {
    let mut prompt = format!(
        "You are an expert podcast scriptwriter for \"{name}\" ({tagline}). \
Write an engaging conversation between two hosts about the input text, in {language}.\n\n\
Person1 is the {role1}. Person2 is the {role2}.\n\
Conversation style: {style}.\n\
Dialogue structure: {structure}.\n\
Engagement techniques: {techniques}.\n\
Target length: about {words} words.\n",
        name = config.podcast_name,
        tagline = config.podcast_tagline,
        language = config.output_language,
        role1 = config.roles_person1,
        role2 = config.roles_person2,
        style = config.conversation_style.join(", "),
        structure = config.dialogue_structure.join(", "),
        techniques = config.engagement_techniques.join(", "),
        words = config.word_count,
    );

    if let Some(intro) = &config.intro {
        prompt.push_str(&format!("Person1 must open the episode with exactly: \"{}\"\n", intro));
    }
    if !config.user_instructions.is_empty() {
        prompt.push_str(&format!("Additional instructions: {}\n", config.user_instructions));
    }

    prompt.push_str(
        "\nFormat rules:\n\
- Wrap every line of speech in <Person1>...</Person1> or <Person2>...</Person2>, alternating speakers.\n\
- Output nothing outside of those tags.\n\
- Do not include stage directions, sound effects, markdown or speaker names inside the tags.\n\
- Spell out symbols and abbreviations the way they should be spoken.",
    );
    prompt
}

//=========================================================================================
// `TranscriptGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranscriptGenerationService for OpenAiTranscriptAdapter {
    /// Asks the LLM for a tagged two-host transcript discussing `content`.
    async fn generate_transcript(
        &self,
        content: &str,
        config: &ConversationConfig,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt(config))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("INPUT TEXT:\n{}", content))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(config.creativity)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Transcript LLM response contained no text content.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcast_core::domain::{PodcastRequest, DEFAULT_BRAND};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OpenAiTranscriptAdapter {
        let config = OpenAIConfig::new()
            .with_api_base(server.uri())
            .with_api_key("sk-test");
        OpenAiTranscriptAdapter::new(Client::with_config(config), "gpt-4o-mini".to_string())
    }

    fn completion(choices: Value) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o-mini",
            "choices": choices
        })
    }

    #[tokio::test]
    async fn returns_the_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!([{
                "index": 0,
                "message": { "role": "assistant", "content": "<Person1>Hi.</Person1>" },
                "finish_reason": "stop"
            }]))))
            .expect(1)
            .mount(&server)
            .await;

        let transcript = adapter(&server)
            .generate_transcript("Oil is flat.", &ConversationConfig::default())
            .await
            .unwrap();

        assert_eq!(transcript, "<Person1>Hi.</Person1>");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "INPUT TEXT:\nOil is flat.");
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!([]))))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .generate_transcript("Oil is flat.", &ConversationConfig::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no text content"));
    }

    #[test]
    fn prompt_describes_hosts_and_intro() {
        let request = PodcastRequest {
            podcast_id: "1".to_string(),
            podcast_name: "Energy Brief".to_string(),
            topic: "energy".to_string(),
            report_text: "Oil is flat.".to_string(),
        };
        let config = ConversationConfig::for_request(&request, DEFAULT_BRAND);

        let prompt = system_prompt(&config);

        assert!(prompt.contains("\"Energy Brief\""));
        assert!(prompt.contains("Person1 is the market analyst. Person2 is the tech strategist."));
        assert!(prompt.contains("professional, analytical, concise"));
        assert!(prompt.contains("exactly: \"Welcome to Energy Brief, by PersonalPod.\""));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn prompt_includes_user_instructions() {
        let config = ConversationConfig {
            user_instructions: "Mention the date twice.".to_string(),
            ..ConversationConfig::default()
        };

        let prompt = system_prompt(&config);

        assert!(prompt.contains("Additional instructions: Mention the date twice."));
        assert!(!prompt.contains("must open the episode"));
    }
}
