//! services/api/src/web/payload.rs
//!
//! Turns the raw body of a generation request into a validated `PodcastRequest`.
//!
//! Parsing is lenient: invalid UTF-8 sequences are dropped from the body and raw
//! control characters inside JSON strings are accepted.

use podcast_core::{domain::PodcastRequest, text::clean_report_text};
use serde_json::{Map, Value};

const SAMPLE_CHARS: usize = 200;

/// Why a request body was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid JSON format: {details}")]
    InvalidJson {
        details: String,
        raw_data_sample: String,
    },
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A validated request plus the keys the client sent, for logging.
#[derive(Debug)]
pub struct ParsedPayload {
    pub request: PodcastRequest,
    pub keys: Vec<String>,
}

/// Parses and validates a request body.
///
/// Field rules:
/// - `podcast_id` comes from `podcast_id`, then `podcastId`, then `"default"`.
///   Numbers are accepted and rendered as strings, so the id is always echoed
///   back to the client as a JSON string.
/// - `prompt` is trimmed; `report_text` is cleaned, then trimmed. Both are
///   required and count as missing when empty afterwards.
/// - `podcast_name` falls back to `Weekly Podcast on {topic}` when it is absent
///   *or* blank, so an episode is never introduced without a name.
/// - Non-string values for the text fields count as absent.
pub fn parse_payload(raw: &[u8]) -> Result<ParsedPayload, RequestError> {
    let raw = decode_ignoring_invalid(raw);
    let invalid = |details: String| RequestError::InvalidJson {
        details,
        raw_data_sample: sample(&raw),
    };

    let value: Value = serde_json::from_str(&escape_control_characters(&raw))
        .map_err(|e| invalid(e.to_string()))?;
    let data = match value {
        Value::Object(map) => map,
        other => return Err(invalid(format!("expected a JSON object, found {}", kind(&other)))),
    };

    let podcast_id = identifier(data.get("podcast_id"))
        .or_else(|| identifier(data.get("podcastId")))
        .unwrap_or_else(|| "default".to_string());
    let topic = string_field(&data, "prompt").trim().to_string();
    let report_text = clean_report_text(string_field(&data, "report_text"))
        .trim()
        .to_string();

    let mut missing = Vec::new();
    if topic.is_empty() {
        missing.push("prompt");
    }
    if report_text.is_empty() {
        missing.push("report_text");
    }
    if !missing.is_empty() {
        return Err(RequestError::MissingFields(missing));
    }

    let podcast_name = match string_field(&data, "podcast_name").trim() {
        "" => format!("Weekly Podcast on {}", topic),
        name => name.to_string(),
    };

    Ok(ParsedPayload {
        request: PodcastRequest {
            podcast_id,
            podcast_name,
            topic,
            report_text,
        },
        keys: data.keys().cloned().collect(),
    })
}

/// Decodes UTF-8, silently skipping byte sequences that are not valid.
fn decode_ignoring_invalid(raw: &[u8]) -> String {
    raw.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn string_field<'a>(data: &'a Map<String, Value>, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Accepts string or numeric ids; empty strings and zero count as absent.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn sample(raw: &str) -> String {
    if raw.chars().count() > SAMPLE_CHARS {
        format!("{}...", raw.chars().take(SAMPLE_CHARS).collect::<String>())
    } else {
        raw.to_string()
    }
}

/// Escapes raw control characters that appear inside JSON string literals.
fn escape_control_characters(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in raw.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
