//! The cartography page session.
//!
//! Load sequence: fetch → inline → bind shapes → fit the viewport. Until the load completes the
//! page ignores pointer and wheel input. A new [`CartographyPage::load`] discards the previous
//! diagram, bindings and view wholesale.

use crate::error::{PageError, Result};
use crate::navigation::{Navigation, activity_url};
use crate::source::DiagramSource;
use cartograph_core::annotate::annotate;
use cartograph_core::dimensions::content_size;
use cartograph_core::geom::Point;
use cartograph_core::{
    BindingSet, CartographyConfig, Control, Controls, Diagram, FitOutcome, IdentifierMap, NodeId,
    ShapeBinder, ShapeBinding, ViewportController, ViewportSurface,
};

pub const PLACEHOLDER_LOADING: &str = "Loading cartography…";
pub const PLACEHOLDER_ABSENT: &str = "No cartography has been imported yet.";
pub const PLACEHOLDER_EMPTY: &str = "No cartography available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Before the first load, or while a fetch is in flight.
    Loading,
    Ready,
    /// The diagram loaded but none of its shapes maps to an activity.
    Empty,
    /// The server has no diagram for this page.
    Absent,
    Failed { message: String },
}

impl PageState {
    /// Text shown in place of (or above) the diagram, if any.
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Loading => Some(PLACEHOLDER_LOADING),
            Self::Ready => None,
            Self::Empty => Some(PLACEHOLDER_EMPTY),
            Self::Absent => Some(PLACEHOLDER_ABSENT),
            Self::Failed { message } => Some(message),
        }
    }

    /// Whether a diagram is on screen and input handlers are wired.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Ready | Self::Empty)
    }
}

pub struct CartographyPage<S> {
    config: CartographyConfig,
    identifier_map: IdentifierMap,
    viewport: ViewportController<S>,
    state: PageState,
    diagram: Option<Diagram>,
    bindings: BindingSet,
}

impl<S: ViewportSurface> CartographyPage<S> {
    pub fn new(
        config: CartographyConfig,
        identifier_map: IdentifierMap,
        surface: S,
        controls: Controls,
    ) -> Self {
        let viewport = ViewportController::new(config.viewport.clone(), surface, controls);
        Self {
            config,
            identifier_map,
            viewport,
            state: PageState::Loading,
            diagram: None,
            bindings: BindingSet::default(),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn config(&self) -> &CartographyConfig {
        &self.config
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    pub fn viewport(&self) -> &ViewportController<S> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController<S> {
        &mut self.viewport
    }

    /// Fetches, inlines, binds and fits the diagram. Failures never propagate: they end in
    /// [`PageState::Failed`] or [`PageState::Absent`]. No retry is attempted.
    pub async fn load<D: DiagramSource>(&mut self, source: &D) -> &PageState {
        self.state = PageState::Loading;
        self.diagram = None;
        self.bindings = BindingSet::default();
        self.viewport.clear();

        self.state = match self.load_inner(source).await {
            Ok(state) => state,
            Err(PageError::Fetch { status: 404 }) => PageState::Absent,
            Err(err) => {
                tracing::warn!(error = %err, "cartography load failed");
                PageState::Failed {
                    message: format!("Unable to load the cartography: {err}"),
                }
            }
        };
        &self.state
    }

    async fn load_inner<D: DiagramSource>(&mut self, source: &D) -> Result<PageState> {
        let response = source.fetch().await?;
        if !response.is_success() {
            return Err(PageError::Fetch {
                status: response.status,
            });
        }
        if response.body.trim().is_empty() {
            return Ok(PageState::Absent);
        }

        let diagram = Diagram::inline(response.body)?;
        let (bindings, size) = {
            let doc = diagram.document()?;
            let binder = ShapeBinder::new(self.config.binder.clone());
            let bindings = binder.bind_all(doc.root_element(), &self.identifier_map);
            (bindings, content_size(doc.root_element()))
        };

        let (width, height) = size.map_or((0.0, 0.0), |s| (s.width, s.height));
        let fit = self.viewport.initialize(width, height);
        tracing::debug!(bindings = bindings.len(), ?fit, "cartography loaded");

        let state = if bindings.is_empty() {
            PageState::Empty
        } else {
            PageState::Ready
        };
        self.diagram = Some(diagram);
        self.bindings = bindings;
        Ok(state)
    }

    /// Call after the viewport element has been laid out or resized.
    pub fn viewport_resized(&mut self) -> Option<FitOutcome> {
        if !self.state.accepts_input() {
            return None;
        }
        self.viewport.retry_fit()
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        if self.state.accepts_input() {
            self.viewport.begin_pan(pointer);
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if self.state.accepts_input() {
            self.viewport.continue_pan(pointer);
        }
    }

    pub fn pointer_up(&mut self) {
        if self.state.accepts_input() {
            self.viewport.end_pan();
        }
    }

    /// Pointer left the viewport mid-drag.
    pub fn pointer_leave(&mut self) {
        if self.state.accepts_input() {
            self.viewport.cancel_pan();
        }
    }

    pub fn wheel(&mut self, delta_y: f64, pointer: Point) -> bool {
        self.state.accepts_input() && self.viewport.wheel(delta_y, pointer)
    }

    pub fn control(&mut self, control: Control) -> bool {
        self.state.accepts_input() && self.viewport.press_control(control)
    }

    pub fn shape_enter(&mut self, target: NodeId) -> Option<&ShapeBinding> {
        if !self.state.accepts_input() {
            return None;
        }
        self.bindings.pointer_enter(target)
    }

    pub fn shape_leave(&mut self, target: NodeId) {
        if self.state.accepts_input() {
            self.bindings.pointer_leave(target);
        }
    }

    /// The hovered shape and the CSS filter to apply to it.
    pub fn highlight(&self) -> Option<(&ShapeBinding, &str)> {
        self.bindings
            .highlighted()
            .map(|b| (b, self.config.binder.highlight_filter.as_str()))
    }

    /// Navigation for a click on `target`, unless the click ended a drag or hit no bound shape.
    pub fn click(&mut self, target: NodeId) -> Option<Navigation> {
        if !self.state.accepts_input() {
            return None;
        }
        let activity_id = self.bindings.click(target, self.viewport.allows_click())?;
        match activity_url(&self.config.navigation, activity_id) {
            Ok(url) => Some(Navigation { activity_id, url }),
            Err(err) => {
                tracing::warn!(error = %err, %activity_id, "cannot build activity URL");
                None
            }
        }
    }

    /// The inlined markup with bound shapes marked interactive.
    pub fn annotated_markup(&self) -> Result<Option<String>> {
        let Some(diagram) = &self.diagram else {
            return Ok(None);
        };
        Ok(Some(annotate(diagram, &self.bindings, &self.config.binder)?))
    }
}
