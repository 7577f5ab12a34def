//! Per-display render state.
//!
//! A [`DiagramDisplay`] owns one diagram source and its render state. The
//! renderer only writes to a display through a [`Ticket`] taken when the render
//! started; [`DiagramDisplay::set_source`] and [`DiagramDisplay::tear_down`]
//! bump the generation, so writes from superseded renders are dropped.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use solview_extract::DiagramSource;

/// Render state of one diagram display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DiagramRenderState {
    /// No render requested for the current source.
    #[default]
    NotRequested,
    /// Waiting for the engine.
    Loading,
    /// Engine ready, render in progress.
    Ready,
    /// Markup produced.
    Rendered,
    /// Terminal failure for the current source.
    Failed(String),
}

/// Markup produced by the engine for a render target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMarkup {
    /// Unique id of the render target.
    pub target_id: String,
    /// Engine output, inserted as-is.
    pub markup: String,
}

/// Proof that a render started at a given generation.
#[derive(Debug)]
pub(crate) struct Ticket(u64);

#[derive(Debug)]
struct DisplayInner {
    source: DiagramSource,
    state: DiagramRenderState,
    content: Option<RenderedMarkup>,
    generation: u64,
    mounted: bool,
}

/// Shared handle to a diagram display.
///
/// Clones refer to the same display.
#[derive(Debug, Clone)]
pub struct DiagramDisplay {
    inner: Rc<RefCell<DisplayInner>>,
}

impl DiagramDisplay {
    /// Create a mounted display for `source`.
    #[must_use]
    pub fn new(source: DiagramSource) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DisplayInner {
                source,
                state: DiagramRenderState::NotRequested,
                content: None,
                generation: 0,
                mounted: true,
            })),
        }
    }

    /// Current render state.
    #[must_use]
    pub fn state(&self) -> DiagramRenderState {
        self.inner.borrow().state.clone()
    }

    /// Current diagram source.
    #[must_use]
    pub fn source(&self) -> DiagramSource {
        self.inner.borrow().source.clone()
    }

    /// Rendered markup, if the current source has been rendered.
    #[must_use]
    pub fn content(&self) -> Option<RenderedMarkup> {
        self.inner.borrow().content.clone()
    }

    /// Whether the display is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    /// Replace the source and reset to `NotRequested`.
    ///
    /// In-flight renders of the previous source are invalidated.
    pub fn set_source(&self, source: DiagramSource) {
        let mut inner = self.inner.borrow_mut();
        inner.source = source;
        inner.state = DiagramRenderState::NotRequested;
        inner.content = None;
        inner.generation += 1;
    }

    /// Unmount the display and reset to `NotRequested`.
    ///
    /// In-flight renders are invalidated and rendered markup is dropped.
    pub fn tear_down(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.mounted = false;
        inner.state = DiagramRenderState::NotRequested;
        inner.content = None;
        inner.generation += 1;
    }

    /// Move `NotRequested` to `Loading` and hand out a ticket.
    ///
    /// Returns `None` when the display is unmounted or a render was already
    /// requested for the current source.
    pub(crate) fn begin(&self) -> Option<Ticket> {
        let mut inner = self.inner.borrow_mut();
        if !inner.mounted || inner.state != DiagramRenderState::NotRequested {
            return None;
        }
        inner.state = DiagramRenderState::Loading;
        Some(Ticket(inner.generation))
    }

    /// Whether writes under `ticket` are still allowed.
    pub(crate) fn is_current(&self, ticket: &Ticket) -> bool {
        let inner = self.inner.borrow();
        inner.mounted && inner.generation == ticket.0
    }

    /// Set the state if `ticket` is current. Returns whether it was written.
    pub(crate) fn transition(&self, ticket: &Ticket, state: DiagramRenderState) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.inner.borrow_mut().state = state;
        true
    }

    /// Store markup and move to `Rendered` if `ticket` is current.
    pub(crate) fn complete(&self, ticket: &Ticket, content: RenderedMarkup) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let mut inner = self.inner.borrow_mut();
        inner.content = Some(content);
        inner.state = DiagramRenderState::Rendered;
        true
    }
}
