//! Artifact to view model composition.

use solview_artifact::{Approach, SolutionArtifact};
use solview_diagrams::{
    DiagramDisplay, DiagramSource, EngineLoader, RenderOutcome, RichDiagramRenderer, parse_steps,
};
use solview_extract::{CodeFenceExtractor, extract_diagram_source};

use crate::view::{ApproachView, DiagramView, SolutionView, ViewModel};

/// Turns solution artifacts into view models.
///
/// The structural path ([`render`](Self::render)) is synchronous and always
/// available. The rich path ([`render_rich`](Self::render_rich)) renders the
/// flowchart through a diagram engine and falls back to the source on failure.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPipeline {
    code: CodeFenceExtractor,
}

impl ArtifactPipeline {
    /// Create a pipeline using `code` for approach code extraction.
    #[must_use]
    pub fn new(code: CodeFenceExtractor) -> Self {
        Self { code }
    }

    /// Render with the structural diagram path.
    #[must_use]
    pub fn render(&self, artifact: &SolutionArtifact) -> ViewModel {
        if let Some(view) = error_view(artifact) {
            return view;
        }
        let diagram = diagram_source(artifact).map_or(DiagramView::Absent, |source| {
            structural_view(&source)
        });
        self.solution_view(artifact, diagram)
    }

    /// Render with the rich diagram path.
    ///
    /// Error artifacts never touch the engine.
    pub async fn render_rich<L: EngineLoader>(
        &self,
        artifact: &SolutionArtifact,
        renderer: &RichDiagramRenderer<L>,
    ) -> ViewModel {
        if let Some(view) = error_view(artifact) {
            return view;
        }
        let diagram = match diagram_source(artifact) {
            Some(source) => rich_view(source, renderer).await,
            None => DiagramView::Absent,
        };
        self.solution_view(artifact, diagram)
    }

    fn solution_view(&self, artifact: &SolutionArtifact, diagram: DiagramView) -> ViewModel {
        ViewModel::Solution(SolutionView {
            explanation: artifact.explanation.clone(),
            approaches: artifact
                .approaches
                .iter()
                .map(|approach| self.approach_view(approach))
                .collect(),
            diagram,
            key_insights: artifact.key_insights.clone(),
            related_concepts: artifact.related_concepts.clone(),
        })
    }

    fn approach_view(&self, approach: &Approach) -> ApproachView {
        ApproachView {
            name: approach.name.clone(),
            complexity: approach.complexity.clone(),
            description: approach.description.clone(),
            pros: approach.pros.clone(),
            cons: approach.cons.clone(),
            code: non_blank(approach.code.as_deref()).map(|code| self.code.extract(code)),
        }
    }
}

fn error_view(artifact: &SolutionArtifact) -> Option<ViewModel> {
    artifact.error.as_ref().map(|message| ViewModel::Error {
        message: message.clone(),
        raw_response: artifact.raw_response.clone(),
    })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

fn diagram_source(artifact: &SolutionArtifact) -> Option<DiagramSource> {
    non_blank(artifact.flowchart.as_deref()).map(extract_diagram_source)
}

fn structural_view(source: &DiagramSource) -> DiagramView {
    let steps = parse_steps(source);
    if steps.is_empty() {
        tracing::debug!("No flowchart steps found, showing raw source");
        return DiagramView::RawSource {
            source: source.raw.clone(),
        };
    }
    DiagramView::Steps { steps }
}

async fn rich_view<L: EngineLoader>(
    source: DiagramSource,
    renderer: &RichDiagramRenderer<L>,
) -> DiagramView {
    let display = DiagramDisplay::new(source);
    match renderer.render(&display).await {
        RenderOutcome::Rendered { target_id, markup } => DiagramView::Rendered { target_id, markup },
        RenderOutcome::Failed { reason, source } => DiagramView::Failed { reason, source },
        // The display is private to this call, so it cannot be superseded.
        RenderOutcome::Cancelled | RenderOutcome::InFlight => structural_view(&display.source()),
    }
}
