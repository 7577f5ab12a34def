//! Diagram engine capability.
//!
//! The engine is an external collaborator that turns diagram source into
//! markup. Engines come in two calling conventions:
//!
//! - [`DiagramEngine`]: `render` resolves to the markup
//! - [`CallbackEngine`]: `render_with_callback` hands the markup to a callback
//!
//! Everything downstream works against [`DiagramEngine`] only. Callback engines
//! are adapted at the boundary with [`CallbackAdapter`], and [`LegacyFallback`]
//! retries a failed render through the callback convention for engines that
//! expose both.

use std::future::Future;

use serde::Serialize;
use tokio::sync::oneshot;

pub use solview_config::SecurityLevel;
use solview_config::{DEFAULT_FONT_FAMILY, DEFAULT_THEME};

/// Engine configuration applied once at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Whether the engine scans and renders the page by itself on load.
    pub start_on_load: bool,
    /// Visual theme.
    pub theme: String,
    /// Input-safety mode.
    pub security_level: SecurityLevel,
    /// Font family for labels.
    pub font_family: String,
}

impl EngineConfig {
    /// Set the theme.
    #[must_use]
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Set the font family.
    #[must_use]
    pub fn font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    /// Set the input-safety mode.
    #[must_use]
    pub fn security_level(mut self, security_level: SecurityLevel) -> Self {
        self.security_level = security_level;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_on_load: false,
            theme: DEFAULT_THEME.to_owned(),
            security_level: SecurityLevel::Loose,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
        }
    }
}

/// Engine failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No engine could be acquired.
    #[error("diagram engine unavailable: {0}")]
    Unavailable(String),
    /// Engine rejected its configuration.
    #[error("diagram engine initialization failed: {0}")]
    Initialize(String),
    /// Engine failed to render a diagram.
    #[error("diagram render failed: {0}")]
    Render(String),
    /// Callback engine dropped the callback without calling it.
    #[error("diagram engine dropped the render callback")]
    CallbackDropped,
}

/// Engine that resolves renders to markup.
pub trait DiagramEngine {
    /// Apply configuration. Called once, before any render.
    fn initialize(&self, config: &EngineConfig) -> impl Future<Output = Result<(), EngineError>>;

    /// Render `source` for the target element `target_id`.
    fn render(
        &self,
        target_id: &str,
        source: &str,
    ) -> impl Future<Output = Result<String, EngineError>>;
}

/// Callback receiving rendered markup.
pub type RenderCallback = Box<dyn FnOnce(String)>;

/// Engine that delivers rendered markup through a callback.
pub trait CallbackEngine {
    /// Apply configuration.
    fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError>;

    /// Start rendering; `callback` receives the markup, now or later.
    fn render_with_callback(
        &self,
        target_id: &str,
        source: &str,
        callback: RenderCallback,
    ) -> Result<(), EngineError>;
}

/// Acquires an engine on first use.
pub trait EngineLoader {
    /// Engine produced by this loader.
    type Engine: DiagramEngine;

    /// Acquire the engine.
    fn load(&self) -> impl Future<Output = Result<Self::Engine, EngineError>>;
}

/// Render through the callback convention and await the markup.
async fn render_via_callback<E: CallbackEngine>(
    engine: &E,
    target_id: &str,
    source: &str,
) -> Result<String, EngineError> {
    let (tx, rx) = oneshot::channel();
    let callback: RenderCallback = Box::new(move |markup| {
        // Receiver gone means the render was abandoned.
        let _ = tx.send(markup);
    });
    engine.render_with_callback(target_id, source, callback)?;
    rx.await.map_err(|_| EngineError::CallbackDropped)
}

/// Presents a [`CallbackEngine`] as a [`DiagramEngine`].
#[derive(Debug)]
pub struct CallbackAdapter<E>(pub E);

impl<E: CallbackEngine> DiagramEngine for CallbackAdapter<E> {
    async fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
        self.0.initialize(config)
    }

    async fn render(&self, target_id: &str, source: &str) -> Result<String, EngineError> {
        render_via_callback(&self.0, target_id, source).await
    }
}

/// Engine exposing both conventions: renders resolve to markup first and fall
/// back to the callback convention when that fails.
#[derive(Debug)]
pub struct LegacyFallback<E>(pub E);

impl<E: DiagramEngine + CallbackEngine> DiagramEngine for LegacyFallback<E> {
    async fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
        DiagramEngine::initialize(&self.0, config).await
    }

    async fn render(&self, target_id: &str, source: &str) -> Result<String, EngineError> {
        match DiagramEngine::render(&self.0, target_id, source).await {
            Ok(markup) => Ok(markup),
            Err(e) => {
                tracing::debug!(target_id, error = %e, "Retrying render with callback convention");
                render_via_callback(&self.0, target_id, source).await
            }
        }
    }
}

/// Engine type of a loader that never produces one.
#[derive(Debug)]
pub enum NoEngine {}

impl DiagramEngine for NoEngine {
    async fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
        match *self {}
    }

    async fn render(&self, _target_id: &str, _source: &str) -> Result<String, EngineError> {
        match *self {}
    }
}

/// Loader for environments without a diagram engine.
#[derive(Debug, Clone)]
pub struct UnavailableLoader {
    reason: String,
}

impl UnavailableLoader {
    /// Create a loader that always fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl EngineLoader for UnavailableLoader {
    type Engine = NoEngine;

    async fn load(&self) -> Result<NoEngine, EngineError> {
        Err(EngineError::Unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Callback engine that calls back immediately, later, or never.
    #[derive(Default)]
    struct TestCallbackEngine {
        defer: bool,
        drop_callback: bool,
        pending: RefCell<Vec<(String, RenderCallback)>>,
    }

    impl TestCallbackEngine {
        fn flush(&self) {
            for (markup, callback) in self.pending.borrow_mut().drain(..) {
                callback(markup);
            }
        }
    }

    impl CallbackEngine for TestCallbackEngine {
        fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
            if config.start_on_load {
                return Err(EngineError::Initialize("start_on_load".to_owned()));
            }
            Ok(())
        }

        fn render_with_callback(
            &self,
            target_id: &str,
            source: &str,
            callback: RenderCallback,
        ) -> Result<(), EngineError> {
            if self.drop_callback {
                return Ok(());
            }
            let markup = format!("<svg id=\"{target_id}\">{source}</svg>");
            if self.defer {
                self.pending.borrow_mut().push((markup, callback));
            } else {
                callback(markup);
            }
            Ok(())
        }
    }

    /// Engine whose markup-returning render always fails.
    struct LegacyOnly {
        callback: TestCallbackEngine,
        primary_calls: Rc<RefCell<usize>>,
    }

    impl DiagramEngine for LegacyOnly {
        async fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
            Ok(())
        }

        async fn render(&self, _target_id: &str, _source: &str) -> Result<String, EngineError> {
            *self.primary_calls.borrow_mut() += 1;
            Err(EngineError::Render("render() returned no markup".to_owned()))
        }
    }

    impl CallbackEngine for LegacyOnly {
        fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
            self.callback.initialize(config)
        }

        fn render_with_callback(
            &self,
            target_id: &str,
            source: &str,
            callback: RenderCallback,
        ) -> Result<(), EngineError> {
            self.callback
                .render_with_callback(target_id, source, callback)
        }
    }

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert!(!config.start_on_load);
        assert_eq!(config.theme, "default");
        assert_eq!(config.security_level, SecurityLevel::Loose);
        assert_eq!(config.font_family, "Arial, sans-serif");
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::default()
            .theme("forest")
            .font_family("Inter")
            .security_level(SecurityLevel::Sandbox);
        assert_eq!(config.theme, "forest");
        assert_eq!(config.font_family, "Inter");
        assert_eq!(config.security_level, SecurityLevel::Sandbox);
    }

    #[tokio::test]
    async fn test_callback_adapter_immediate() {
        let engine = CallbackAdapter(TestCallbackEngine::default());
        let markup = engine.render("flowchart-1", "A[x]").await.unwrap();
        assert_eq!(markup, "<svg id=\"flowchart-1\">A[x]</svg>");
    }

    #[tokio::test]
    async fn test_callback_adapter_deferred() {
        let engine = CallbackAdapter(TestCallbackEngine {
            defer: true,
            ..TestCallbackEngine::default()
        });
        let (markup, ()) = tokio::join!(engine.render("t", "src"), async {
            tokio::task::yield_now().await;
            engine.0.flush();
        });
        assert_eq!(markup.unwrap(), "<svg id=\"t\">src</svg>");
    }

    #[tokio::test]
    async fn test_callback_adapter_dropped_callback() {
        let engine = CallbackAdapter(TestCallbackEngine {
            drop_callback: true,
            ..TestCallbackEngine::default()
        });
        let err = engine.render("t", "src").await.unwrap_err();
        assert_eq!(err, EngineError::CallbackDropped);
    }

    #[tokio::test]
    async fn test_callback_adapter_initialize_delegates() {
        let engine = CallbackAdapter(TestCallbackEngine::default());
        let config = EngineConfig {
            start_on_load: true,
            ..EngineConfig::default()
        };
        let err = engine.initialize(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::Initialize(_)));
    }

    #[tokio::test]
    async fn test_legacy_fallback_uses_callback_after_failure() {
        let primary_calls = Rc::new(RefCell::new(0));
        let engine = LegacyFallback(LegacyOnly {
            callback: TestCallbackEngine::default(),
            primary_calls: Rc::clone(&primary_calls),
        });
        let markup = engine.render("t", "A[x]").await.unwrap();
        assert_eq!(markup, "<svg id=\"t\">A[x]</svg>");
        assert_eq!(*primary_calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_legacy_fallback_prefers_primary() {
        let engine = LegacyFallback(DualEngine);
        let markup = engine.render("t", "s").await.unwrap();
        assert_eq!(markup, "primary");
    }

    struct DualEngine;

    impl DiagramEngine for DualEngine {
        async fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
            Ok(())
        }

        async fn render(&self, _target_id: &str, _source: &str) -> Result<String, EngineError> {
            Ok("primary".to_owned())
        }
    }

    impl CallbackEngine for DualEngine {
        fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
            Ok(())
        }

        fn render_with_callback(
            &self,
            _target_id: &str,
            _source: &str,
            callback: RenderCallback,
        ) -> Result<(), EngineError> {
            callback("legacy".to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unavailable_loader() {
        let loader = UnavailableLoader::new("no engine configured");
        let err = loader.load().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "diagram engine unavailable: no engine configured"
        );
    }
}
