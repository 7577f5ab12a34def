//! Tolerant decoding of raw solving-service responses.
//!
//! The service is asked for pure JSON but frequently wraps it in a markdown
//! fence or surrounds it with prose. [`decode_response`] tries, in order:
//!
//! 1. the whole text as JSON
//! 2. the body of a ```` ```json ```` fence
//! 3. the span from the first `{` to the last `}`
//! 4. a degraded artifact that keeps the raw text for display

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::{Approach, SolutionArtifact};

/// Maximum number of characters of raw response kept on a degraded artifact.
pub const RAW_RESPONSE_LIMIT: usize = 2000;

const JSON_FENCE: &str = "```json";

static EXPLANATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""explanation":\s*"([^"]*(?:\\.[^"]*)*)""#).expect("invalid explanation regex")
});

/// Decode a raw response into an artifact. Never fails.
#[must_use]
pub fn decode_response(response_text: &str) -> SolutionArtifact {
    let text = response_text.trim();

    if let Some(artifact) = parse_json(text) {
        return artifact;
    }
    tracing::debug!("Response is not plain JSON, trying fenced block");

    if let Some(artifact) = fenced_json(text).and_then(parse_json) {
        return artifact;
    }
    tracing::debug!("No usable json fence, trying brace span");

    if let Some(artifact) = brace_span(text).and_then(parse_json) {
        return artifact;
    }
    tracing::debug!(len = text.len(), "Falling back to degraded artifact");

    degraded_artifact(text)
}

/// Parse text as a JSON object artifact. Other JSON values are rejected.
fn parse_json(text: &str) -> Option<SolutionArtifact> {
    match serde_json::from_str::<Value>(text).ok()? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Text between the first `json` fence tag and the last fence marker.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let end = text.rfind("```")?;
    (end > start).then(|| text[start..end].trim())
}

/// Span from the first `{` to the last `}` inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn degraded_artifact(text: &str) -> SolutionArtifact {
    let explanation = EXPLANATION_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || "Problem analysis provided by AI".to_owned(),
            |m| m.as_str().to_owned(),
        );

    SolutionArtifact {
        explanation,
        approaches: vec![Approach {
            name: "AI Solution".to_owned(),
            complexity: "Analysis provided in raw response".to_owned(),
            description: "The AI provided a solution but formatting was unclear. \
                          Please try a simpler problem statement."
                .to_owned(),
            pros: Some(vec!["AI-generated solution".to_owned()]),
            cons: Some(vec!["Formatting issues".to_owned()]),
            code: Some("# See raw response for code details".to_owned()),
        }],
        flowchart: Some(
            "graph TD\n    A[Problem] --> B[AI Analysis]\n    B --> C[Solution]".to_owned(),
        ),
        key_insights: Some(vec!["AI response formatting needs improvement".to_owned()]),
        related_concepts: Some(vec![
            "Problem solving".to_owned(),
            "AI assistance".to_owned(),
        ]),
        error: None,
        raw_response: Some(truncate_chars(text, RAW_RESPONSE_LIMIT)),
    }
}

/// Truncate to `limit` characters, appending `...` when shortened.
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_owned(),
    }
}
