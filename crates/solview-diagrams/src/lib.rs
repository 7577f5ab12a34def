//! Flowchart parsing and engine-backed diagram rendering.
//!
//! Two independent paths turn a [`DiagramSource`] into something displayable:
//!
//! - [`parse_steps`]: structural path, a typed step list without any engine
//! - [`RichDiagramRenderer`]: rich path, lazily acquires a [`DiagramEngine`]
//!   and falls back to the verbatim source when anything goes wrong
//!
//! # Architecture
//!
//! - [`structural`]: `ident[label]` / `ident{label}` step parsing
//! - [`engine`]: engine traits, callback adapter, configuration
//! - [`state`]: per-display render state with generation tickets
//! - [`renderer`]: memoized engine acquisition and the render state machine
//! - [`kroki`]: engine backed by a Kroki server
//!
//! # Example
//!
//! ```
//! use solview_diagrams::{StepKind, parse_steps};
//! use solview_extract::extract_diagram_source;
//!
//! let source = extract_diagram_source("graph TD\n  A[Start]\n  B{Valid?}\n  B -->|Yes| C[Done]");
//! let steps = parse_steps(&source);
//! assert_eq!(steps.len(), 3);
//! assert_eq!(steps[1].kind, StepKind::Decision);
//! assert_eq!(steps[2].label, "Done");
//! ```

mod consts;
pub mod engine;
pub mod kroki;
pub mod renderer;
pub mod state;
pub mod structural;

pub use consts::{DEFAULT_TIMEOUT, TARGET_ID_PREFIX};
pub use engine::{
    CallbackAdapter, CallbackEngine, DiagramEngine, EngineConfig, EngineError, EngineLoader,
    LegacyFallback, NoEngine, RenderCallback, SecurityLevel, UnavailableLoader,
};
pub use kroki::{KrokiEngine, KrokiLoader};
pub use renderer::{RenderOutcome, RichDiagramRenderer, new_target_id};
pub use solview_extract::DiagramSource;
pub use state::{DiagramDisplay, DiagramRenderState, RenderedMarkup};
pub use structural::{FlowStep, StepKind, parse_steps};
