//! Structural flowchart parsing.
//!
//! Extracts node declarations from Mermaid flowchart source without a
//! rendering engine. Edges, styles and subgraphs are ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use solview_extract::DiagramSource;

static NODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\[(.*?)\]|(\w+)\{(.*?)\}").expect("invalid node regex")
});

/// Shape of a flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// `id[label]`
    Process,
    /// `id{label}`
    Decision,
}

impl StepKind {
    /// Return kind as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Decision => "decision",
        }
    }
}

/// One declared node, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    /// Node identifier.
    pub id: String,
    /// Label text between the delimiters.
    pub label: String,
    /// Node shape.
    pub kind: StepKind,
}

/// Parse node declarations from diagram source.
///
/// Each non-blank line contributes at most one step: its first `id[label]` or
/// `id{label}` occurrence. Lines without one are skipped. Duplicate ids are
/// kept, one step per occurrence.
///
/// An empty result means the caller should show the raw source instead.
#[must_use]
pub fn parse_steps(source: &DiagramSource) -> Vec<FlowStep> {
    source
        .raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<FlowStep> {
    let caps = NODE_PATTERN.captures(line)?;

    let (id, label, kind) = if let (Some(id), Some(label)) = (caps.get(1), caps.get(2)) {
        (id, label, StepKind::Process)
    } else {
        (caps.get(3)?, caps.get(4)?, StepKind::Decision)
    };

    Some(FlowStep {
        id: id.as_str().to_owned(),
        label: label.as_str().to_owned(),
        kind,
    })
}
