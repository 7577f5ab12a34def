//! Internal constants for diagram rendering.

use std::time::Duration;

/// Prefix of generated render target ids.
pub const TARGET_ID_PREFIX: &str = "flowchart";

/// Default HTTP timeout for Kroki requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(solview_config::DEFAULT_TIMEOUT_SECS);

/// Kroki endpoint for Mermaid sources.
pub const KROKI_MERMAID_ENDPOINT: &str = "mermaid";
