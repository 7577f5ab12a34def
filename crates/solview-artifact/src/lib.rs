//! Solution artifacts returned by the problem-solving service.
//!
//! The service answers with loosely structured JSON produced by a language
//! model. This crate models that payload with explicit optional fields and
//! decodes it tolerantly:
//!
//! - [`SolutionArtifact`] / [`Approach`]: the payload, with absent fields
//!   represented as `None` or empty collections
//! - non-text values in text fields are coerced to their JSON text
//! - [`decode_response`]: recovers an artifact from raw response text using
//!   layered fallback strategies
//!
//! # Example
//!
//! ```
//! use solview_artifact::decode_response;
//!
//! let artifact = decode_response(r#"{"explanation": "Two pointers", "approaches": []}"#);
//! assert_eq!(artifact.explanation, "Two pointers");
//! assert!(artifact.approaches.is_empty());
//! ```

mod decode;
mod text;
mod types;

pub use decode::{RAW_RESPONSE_LIMIT, decode_response};
pub use types::{Approach, SolutionArtifact};
