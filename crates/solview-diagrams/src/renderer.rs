//! Engine-backed diagram rendering with raw-source fallback.

use serde::Serialize;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::consts::TARGET_ID_PREFIX;
use crate::engine::{DiagramEngine, EngineConfig, EngineError, EngineLoader};
use crate::state::{DiagramDisplay, DiagramRenderState, RenderedMarkup, Ticket};

/// Result of a render request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Engine markup for the current source.
    Rendered {
        /// Unique id of the render target.
        target_id: String,
        /// Engine output.
        markup: String,
    },
    /// Rendering failed; display the source instead.
    Failed {
        /// Failure description.
        reason: String,
        /// Source exactly as handed to the extractor.
        source: String,
    },
    /// The display was torn down or its source replaced.
    Cancelled,
    /// Another render of the same source is still running.
    InFlight,
}

/// Generate a unique render target id.
#[must_use]
pub fn new_target_id() -> String {
    format!("{TARGET_ID_PREFIX}-{}", Uuid::new_v4().simple())
}

/// Renders diagram displays through a lazily acquired engine.
///
/// The engine is loaded and initialized on the first render request. The
/// outcome of that initialization, success or failure, is kept for the
/// lifetime of the renderer; concurrent first requests await the same
/// initialization.
///
/// The guard is per renderer. Share one renderer between all displays that
/// should see the same engine.
pub struct RichDiagramRenderer<L: EngineLoader> {
    loader: L,
    config: EngineConfig,
    engine: OnceCell<Result<L::Engine, EngineError>>,
}

impl<L: EngineLoader> RichDiagramRenderer<L> {
    /// Create a renderer with the default engine configuration.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, EngineConfig::default())
    }

    /// Create a renderer with an explicit engine configuration.
    #[must_use]
    pub fn with_config(loader: L, config: EngineConfig) -> Self {
        Self {
            loader,
            config,
            engine: OnceCell::new(),
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether engine initialization has completed, successfully or not.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.engine.initialized()
    }

    /// Render the display's current source.
    ///
    /// A display that already left `NotRequested` is not rendered again; its
    /// current outcome is reported instead.
    pub async fn render(&self, display: &DiagramDisplay) -> RenderOutcome {
        let Some(ticket) = display.begin() else {
            return current_outcome(display);
        };
        let source = display.source();

        let engine = match self.engine().await {
            Ok(engine) => engine,
            Err(e) => return fail(display, &ticket, &source.original, &e),
        };
        if !display.transition(&ticket, DiagramRenderState::Ready) {
            return RenderOutcome::Cancelled;
        }

        let target_id = new_target_id();
        let result = engine.render(&target_id, &source.raw).await;

        match result {
            Ok(markup) => {
                let content = RenderedMarkup {
                    target_id: target_id.clone(),
                    markup: markup.clone(),
                };
                if display.complete(&ticket, content) {
                    RenderOutcome::Rendered { target_id, markup }
                } else {
                    RenderOutcome::Cancelled
                }
            }
            Err(e) => fail(display, &ticket, &source.original, &e),
        }
    }

    /// Get the engine, loading and initializing it on first use.
    async fn engine(&self) -> Result<&L::Engine, EngineError> {
        self.engine
            .get_or_init(|| self.acquire())
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    async fn acquire(&self) -> Result<L::Engine, EngineError> {
        let engine = self.loader.load().await?;
        engine.initialize(&self.config).await?;
        tracing::info!(
            theme = %self.config.theme,
            security_level = self.config.security_level.as_str(),
            "Diagram engine initialized"
        );
        Ok(engine)
    }
}

fn fail(
    display: &DiagramDisplay,
    ticket: &Ticket,
    original: &str,
    error: &EngineError,
) -> RenderOutcome {
    let reason = error.to_string();
    if !display.transition(ticket, DiagramRenderState::Failed(reason.clone())) {
        return RenderOutcome::Cancelled;
    }
    tracing::warn!(error = %reason, "Diagram render failed, showing source");
    RenderOutcome::Failed {
        reason,
        source: original.to_owned(),
    }
}

fn current_outcome(display: &DiagramDisplay) -> RenderOutcome {
    if !display.is_mounted() {
        return RenderOutcome::Cancelled;
    }
    match display.state() {
        DiagramRenderState::Rendered => match display.content() {
            Some(RenderedMarkup { target_id, markup }) => {
                RenderOutcome::Rendered { target_id, markup }
            }
            None => RenderOutcome::InFlight,
        },
        DiagramRenderState::Failed(reason) => RenderOutcome::Failed {
            reason,
            source: display.source().original,
        },
        DiagramRenderState::NotRequested
        | DiagramRenderState::Loading
        | DiagramRenderState::Ready => RenderOutcome::InFlight,
    }
}
