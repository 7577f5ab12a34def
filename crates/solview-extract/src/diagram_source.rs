//! Diagram source extraction.
//!
//! Flowcharts are often delivered unfenced, so unlike code extraction only a
//! fence explicitly tagged for the diagram language is unwrapped.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fence;

/// Fence tag of the diagram mini-language.
pub const DIAGRAM_TAG: &str = "mermaid";

static CLOSED_DIAGRAM_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)```({DIAGRAM_TAG})\b[ \t]*\r?\n?(.*?)```"))
        .expect("invalid diagram fence regex")
});

static OPEN_DIAGRAM_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)```({DIAGRAM_TAG})\b[ \t]*\r?\n?(.*)\z"))
        .expect("invalid diagram fence regex")
});

/// Diagram description ready for parsing or rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramSource {
    /// Diagram text: the fence body when fenced, otherwise the input unchanged.
    pub raw: String,
    /// Text the source was extracted from.
    pub original: String,
}

/// Extract diagram source from `input`.
///
/// The first fence tagged [`DIAGRAM_TAG`] is unwrapped and trimmed; any other input
/// is passed through unchanged.
#[must_use]
pub fn extract_diagram_source(input: &str) -> DiagramSource {
    let found = CLOSED_DIAGRAM_FENCE
        .captures(input)
        .map(|caps| fence::from_captures(&caps, true))
        .or_else(|| {
            OPEN_DIAGRAM_FENCE
                .captures(input)
                .map(|caps| fence::from_captures(&caps, false))
        });

    let raw = match found {
        Some(found) => {
            if !found.closed {
                tracing::debug!("Diagram fence is not closed, using rest of input");
            }
            found.body.trim().to_owned()
        }
        None => input.to_owned(),
    };

    DiagramSource {
        raw,
        original: input.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fenced_mermaid() {
        let source = extract_diagram_source("```mermaid\ngraph TD\n  A[Start] --> B[End]\n```");
        assert_eq!(source.raw, "graph TD\n  A[Start] --> B[End]");
        assert_ne!(source.raw, source.original);
    }

    #[test]
    fn test_unfenced_passthrough_is_unchanged() {
        let input = "  graph TD\n  A[Start]\n";
        let source = extract_diagram_source(input);
        assert_eq!(source.raw, input);
        assert_eq!(source.original, input);
    }

    #[test]
    fn test_other_fence_tags_are_not_unwrapped() {
        let input = "```text\nA[Start]\n```";
        let source = extract_diagram_source(input);
        assert_eq!(source.raw, input);
    }

    #[test]
    fn test_mermaid_fence_after_other_fence() {
        let input = "```python\nx = 1\n```\n```mermaid\nA{Ok?}\n```";
        let source = extract_diagram_source(input);
        assert_eq!(source.raw, "A{Ok?}");
    }

    #[test]
    fn test_tag_must_end_at_word_boundary() {
        let input = "```mermaidish\nA[Start]\n```";
        let source = extract_diagram_source(input);
        assert_eq!(source.raw, input);
    }

    #[test]
    fn test_unclosed_mermaid_fence() {
        let source = extract_diagram_source("```mermaid\nflowchart LR\nA[Go]\n");
        assert_eq!(source.raw, "flowchart LR\nA[Go]");
    }

    #[test]
    fn test_original_is_kept() {
        let input = "intro\n```mermaid\nA[x]\n```";
        let source = extract_diagram_source(input);
        assert_eq!(source.original, input);
    }
}
