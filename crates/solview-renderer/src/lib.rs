//! Solution artifact rendering.
//!
//! [`ArtifactPipeline`] composes code extraction and diagram handling into a
//! [`ViewModel`]; [`render_html`] turns a view model into an HTML fragment.
//!
//! # Architecture
//!
//! - Structural path: [`ArtifactPipeline::render`], synchronous, no engine
//! - Rich path: [`ArtifactPipeline::render_rich`], renders the flowchart through
//!   a [`RichDiagramRenderer`](solview_diagrams::RichDiagramRenderer) and falls
//!   back to the source when the engine fails
//!
//! An artifact carrying an error renders to [`ViewModel::Error`] only.
//!
//! # Example
//!
//! ```
//! use solview_artifact::decode_response;
//! use solview_renderer::{ArtifactPipeline, DiagramView, render_html};
//!
//! let artifact = decode_response(r#"{"explanation": "Sum pairs", "flowchart": "A[Start]\nB{Done?}"}"#);
//! let view = ArtifactPipeline::default().render(&artifact);
//!
//! let solution = view.as_solution().unwrap();
//! assert!(matches!(solution.diagram, DiagramView::Steps { .. }));
//! assert!(render_html(&view).contains("step-decision"));
//! ```

mod html;
mod pipeline;
mod view;

pub use html::{escape_html, render_html};
pub use pipeline::ArtifactPipeline;
pub use view::{ApproachView, DiagramView, SolutionView, ViewModel};
