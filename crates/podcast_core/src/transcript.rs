//! crates/podcast_core/src/transcript.rs
//!
//! Parsing and rendering of the tagged two-speaker transcripts exchanged with
//! the transcript model.

use crate::domain::{DialogueTurn, Speaker};
use crate::ports::{PortError, PortResult};
use regex::Regex;
use std::sync::OnceLock;

fn turn_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<(Person1|Person2)>(.*?)</(?:Person1|Person2)>")
            .expect("transcript pattern is valid")
    })
}

/// Splits a tagged transcript into ordered dialogue turns.
///
/// Text outside of the tags is ignored, as are turns with no spoken content.
pub fn parse_transcript(raw: &str) -> PortResult<Vec<DialogueTurn>> {
    let turns: Vec<DialogueTurn> = turn_pattern()
        .captures_iter(raw)
        .filter_map(|caps| {
            let speaker = match &caps[1] {
                "Person1" => Speaker::Person1,
                _ => Speaker::Person2,
            };
            let text = caps[2].trim();
            (!text.is_empty()).then(|| DialogueTurn {
                speaker,
                text: text.to_string(),
            })
        })
        .collect();

    if turns.is_empty() {
        return Err(PortError::Unexpected(
            "Transcript contained no <Person1>/<Person2> dialogue".to_string(),
        ));
    }
    Ok(turns)
}

/// Renders turns back into the tagged form, one turn per line.
pub fn render_transcript(turns: &[DialogueTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("<{tag}>{}</{tag}>", turn.text, tag = turn.speaker.tag()))
        .collect::<Vec<_>>()
        .join("\n")
}
