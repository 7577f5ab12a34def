//! Code snippet extraction.

use serde::Serialize;

use crate::fence;

/// Language tag assumed when a snippet carries none.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Code body with its language tag.
///
/// `body` never contains the fence delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSnippet {
    /// Language tag (fallback default when the input had none).
    pub language: String,
    /// Code with fence markers stripped and surrounding whitespace trimmed.
    pub body: String,
}

/// Extracts the first fenced code block from free text.
///
/// Input without any fence is treated as bare code. Extraction never fails.
#[derive(Debug, Clone)]
pub struct CodeFenceExtractor {
    fallback_language: String,
}

impl CodeFenceExtractor {
    /// Create an extractor with the given fallback language.
    #[must_use]
    pub fn new(fallback_language: impl Into<String>) -> Self {
        Self {
            fallback_language: fallback_language.into(),
        }
    }

    /// Extract a snippet from `input`.
    ///
    /// Only the first fence is honored; any text after it is dropped.
    #[must_use]
    pub fn extract(&self, input: &str) -> CodeSnippet {
        let Some(found) = fence::find_first(input) else {
            return CodeSnippet {
                language: self.fallback_language.clone(),
                body: input.trim().to_owned(),
            };
        };

        if !found.closed {
            tracing::debug!("Code fence is not closed, using rest of input");
        }

        CodeSnippet {
            language: found
                .tag
                .map_or_else(|| self.fallback_language.clone(), str::to_owned),
            body: found.body.trim().to_owned(),
        }
    }
}

impl Default for CodeFenceExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}
