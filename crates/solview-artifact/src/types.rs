//! Artifact payload types.

use serde::{Deserialize, Serialize};

use crate::text;

/// Structured solution payload from the solving service.
///
/// Every field may be absent upstream. When `error` is set, the rest of the
/// payload is not displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SolutionArtifact {
    /// Explanation of the problem.
    #[serde(default, deserialize_with = "text::text")]
    pub explanation: String,
    /// Candidate solution approaches, in display order.
    #[serde(default, deserialize_with = "text::approaches")]
    pub approaches: Vec<Approach>,
    /// Flowchart source, usually Mermaid and possibly fenced.
    #[serde(
        default,
        deserialize_with = "text::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub flowchart: Option<String>,
    /// Key insights.
    #[serde(
        rename = "keyInsights",
        default,
        deserialize_with = "text::optional_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_insights: Option<Vec<String>>,
    /// Related concepts.
    #[serde(
        rename = "relatedConcepts",
        default,
        deserialize_with = "text::optional_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_concepts: Option<Vec<String>>,
    /// Upstream error message.
    #[serde(
        default,
        deserialize_with = "text::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    /// Raw upstream response, attached when the payload was reconstructed.
    #[serde(
        default,
        deserialize_with = "text::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_response: Option<String>,
}

impl SolutionArtifact {
    /// Create an artifact that carries only an error.
    #[must_use]
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// One solution approach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Approach {
    /// Approach name (e.g., "Brute Force").
    #[serde(default, deserialize_with = "text::text")]
    pub name: String,
    /// Time and space complexity.
    #[serde(default, deserialize_with = "text::text")]
    pub complexity: String,
    /// Description of the approach.
    #[serde(default, deserialize_with = "text::text")]
    pub description: String,
    /// Advantages.
    #[serde(
        default,
        deserialize_with = "text::optional_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub pros: Option<Vec<String>>,
    /// Disadvantages.
    #[serde(
        default,
        deserialize_with = "text::optional_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub cons: Option<Vec<String>>,
    /// Raw code, possibly wrapped in a markdown fence.
    #[serde(
        default,
        deserialize_with = "text::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
}
