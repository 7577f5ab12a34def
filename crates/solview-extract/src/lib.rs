//! Extraction of code and diagram sources from markdown fences.
//!
//! Upstream text may or may not wrap its content in a fence, and the fence may
//! or may not carry a language tag. Both extractors treat "no fence" as a normal
//! outcome and fall back to the whole input:
//!
//! - [`CodeFenceExtractor`]: first fenced block → [`CodeSnippet`]
//! - [`extract_diagram_source`]: first `mermaid` fenced block → [`DiagramSource`]
//!
//! # Example
//!
//! ```
//! use solview_extract::{CodeFenceExtractor, extract_diagram_source};
//!
//! let snippet = CodeFenceExtractor::default().extract("```rust\nfn main() {}\n```");
//! assert_eq!(snippet.language, "rust");
//! assert_eq!(snippet.body, "fn main() {}");
//!
//! let source = extract_diagram_source("graph TD\nA[Start]");
//! assert_eq!(source.raw, "graph TD\nA[Start]");
//! ```

mod code;
mod diagram_source;
mod fence;

pub use code::{CodeFenceExtractor, CodeSnippet, DEFAULT_LANGUAGE};
pub use diagram_source::{DIAGRAM_TAG, DiagramSource, extract_diagram_source};
pub use fence::FENCE;
