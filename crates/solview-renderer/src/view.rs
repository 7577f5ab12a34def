//! View model consumed by presentation backends.

use serde::Serialize;
use solview_diagrams::FlowStep;
use solview_extract::CodeSnippet;

/// Displayable form of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewModel {
    /// Upstream error; nothing else is shown.
    Error {
        /// Error text.
        message: String,
        /// Raw upstream response, when available.
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_response: Option<String>,
    },
    /// Solution content.
    Solution(SolutionView),
}

impl ViewModel {
    /// Solution view, if this is not an error.
    #[must_use]
    pub fn as_solution(&self) -> Option<&SolutionView> {
        match self {
            Self::Solution(view) => Some(view),
            Self::Error { .. } => None,
        }
    }
}

/// Solution content in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionView {
    pub explanation: String,
    pub approaches: Vec<ApproachView>,
    pub diagram: DiagramView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_insights: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_concepts: Option<Vec<String>>,
}

/// One approach card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproachView {
    pub name: String,
    pub complexity: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<Vec<String>>,
    /// Extracted code, when the approach carries non-blank code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeSnippet>,
}

/// Flowchart section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DiagramView {
    /// Parsed steps in declaration order. Never empty.
    Steps { steps: Vec<FlowStep> },
    /// Source shown as-is because no steps could be parsed.
    RawSource { source: String },
    /// Engine markup, inserted without escaping.
    Rendered { target_id: String, markup: String },
    /// Engine failure with the source kept verbatim.
    Failed { reason: String, source: String },
    /// The artifact has no flowchart.
    Absent,
}
