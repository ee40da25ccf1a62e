//! crates/podcast_core/src/text.rs
//!
//! Text preparation applied to incoming reports before they reach the generator.

use crate::domain::PodcastRequest;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

const DISCLAIMER: &str = "Note: This report is generated using AI analysis of market data and trends. Always conduct your own research.";

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"))
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[^\w\s.,;:()\-'"\n]"#).expect("character filter pattern is valid")
    })
}

/// Strips markdown emphasis and headings, squeezes blank lines and drops any
/// character the speech pipeline cannot pronounce.
pub fn clean_report_text(text: &str) -> String {
    let text = text.replace("**", "").replace('#', "");
    let text = blank_lines().replace_all(&text, "\n");
    disallowed_chars().replace_all(&text, "").into_owned()
}

/// Wraps the report in the header and disclaimer read out in every episode.
pub fn structured_content(request: &PodcastRequest, date: NaiveDate) -> String {
    format!(
        "Weekly {} Podcast (ID: {}) - {}\n\n{}\n\n{}",
        request.topic,
        request.podcast_id,
        date.format("%Y-%m-%d"),
        request.report_text,
        DISCLAIMER
    )
}
