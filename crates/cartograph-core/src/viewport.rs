//! Pan/zoom controller for a diagram rendered inside a fixed-size viewport element.

use crate::config::ViewportConfig;
use crate::geom::{Point, Size, Vector, point, positive_size, vector};
use crate::gesture::PointerGesture;
use crate::transform::ContentTransform;

/// Host-side view of the viewport element and its content layer.
pub trait ViewportSurface {
    /// `None` when the viewport element is absent from the page; a zero size means the
    /// element exists but has not been laid out yet.
    fn viewport_size(&self) -> Option<Size>;

    fn apply_transform(&mut self, transform: &ContentTransform);

    fn set_readout(&mut self, _text: &str) {}

    /// Removes the content transform; the viewport shows nothing until the next render.
    fn clear(&mut self) {}
}

/// A headless surface with a fixed size that records what was applied to it.
#[derive(Debug, Clone, Default)]
pub struct FixedSurface {
    pub size: Option<Size>,
    pub transform: Option<ContentTransform>,
    pub readout: Option<String>,
    pub renders: usize,
}

impl FixedSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some(crate::geom::size(width, height)),
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn css(&self) -> Option<String> {
        self.transform.map(|t| t.to_css())
    }
}

impl ViewportSurface for FixedSurface {
    fn viewport_size(&self) -> Option<Size> {
        self.size
    }

    fn apply_transform(&mut self, transform: &ContentTransform) {
        self.transform = Some(*transform);
        self.renders += 1;
    }

    fn set_readout(&mut self, text: &str) {
        self.readout = Some(text.to_string());
    }

    fn clear(&mut self) {
        self.transform = None;
        self.readout = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ZoomIn,
    ZoomOut,
    Reset,
}

/// Which optional zoom affordances exist on the page. Missing ones are never wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub reset: bool,
    pub readout: bool,
}

impl Controls {
    pub fn all() -> Self {
        Self {
            zoom_in: true,
            zoom_out: true,
            reset: true,
            readout: true,
        }
    }

    pub fn none() -> Self {
        Self {
            zoom_in: false,
            zoom_out: false,
            reset: false,
            readout: false,
        }
    }

    pub fn has(&self, control: Control) -> bool {
        match control {
            Control::ZoomIn => self.zoom_in,
            Control::ZoomOut => self.zoom_out,
            Control::Reset => self.reset,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    Applied { scale: f64 },
    /// The viewport measured `0x0`; call [`ViewportController::retry_fit`] once laid out.
    Deferred { attempt: u32 },
    /// Retries ran out; the default scale was applied instead.
    Abandoned,
    /// No viewport element.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub pan: Vector,
    /// `None` when the content dimensions are unknown.
    pub content: Option<Size>,
    pub gesture: PointerGesture,
}

impl ViewportState {
    fn new(content: Option<Size>, scale: f64) -> Self {
        Self {
            scale,
            pan: vector(0.0, 0.0),
            content,
            gesture: PointerGesture::default(),
        }
    }

    pub fn transform(&self) -> ContentTransform {
        ContentTransform::new(self.pan, self.scale)
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn drag_anchor(&self) -> Option<Point> {
        match self.gesture {
            PointerGesture::Pressed { anchor, .. } | PointerGesture::Dragging { anchor, .. } => {
                Some(anchor)
            }
            PointerGesture::Idle { .. } => None,
        }
    }

    pub fn pan_at_drag_start(&self) -> Option<Vector> {
        match self.gesture {
            PointerGesture::Pressed { pan_at_press, .. }
            | PointerGesture::Dragging { pan_at_press, .. } => Some(pan_at_press),
            PointerGesture::Idle { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingFit {
    attempts: u32,
}

pub struct ViewportController<S> {
    config: ViewportConfig,
    controls: Controls,
    surface: S,
    state: ViewportState,
    pending_fit: Option<PendingFit>,
}

impl<S: ViewportSurface> ViewportController<S> {
    pub fn new(config: ViewportConfig, surface: S, controls: Controls) -> Self {
        let state = ViewportState::new(None, config.clamp_scale(config.default_scale));
        Self {
            config,
            controls,
            surface,
            state,
            pending_fit: None,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn is_fit_pending(&self) -> bool {
        self.pending_fit.is_some()
    }

    /// Drops the current view: content size, scale, pan, any gesture in progress and a pending
    /// fit. The surface is cleared as well.
    pub fn clear(&mut self) {
        let scale = self.config.clamp_scale(self.config.default_scale);
        self.state = ViewportState::new(None, scale);
        self.pending_fit = None;
        self.surface.clear();
    }

    /// Starts a fresh view over content of the given size and fits it into the viewport.
    ///
    /// Non-positive or non-finite dimensions are treated as unknown and fall back to the
    /// configured default scale.
    pub fn initialize(&mut self, content_width: f64, content_height: f64) -> FitOutcome {
        let content = positive_size(content_width, content_height);
        if content.is_none() {
            tracing::warn!(
                content_width,
                content_height,
                "unusable content dimensions; using default scale"
            );
        }
        let scale = self.config.clamp_scale(self.config.default_scale);
        self.state = ViewportState::new(content, scale);
        self.pending_fit = None;
        self.fit()
    }

    /// Re-fits and re-centers the current content (the "reset zoom" control).
    pub fn reset_to_fit(&mut self) -> FitOutcome {
        self.pending_fit = None;
        self.fit()
    }

    /// Retries a fit deferred because the viewport was not measurable. Returns `None` when no
    /// fit is pending.
    pub fn retry_fit(&mut self) -> Option<FitOutcome> {
        let pending = self.pending_fit?;
        let viewport = self.surface.viewport_size()?;
        if positive_size(viewport.width, viewport.height).is_some() {
            self.pending_fit = None;
            return Some(self.fit());
        }

        let attempts = pending.attempts + 1;
        if attempts > self.config.max_measure_retries {
            tracing::debug!(attempts, "viewport never became measurable; giving up on fit");
            self.pending_fit = None;
            self.state.scale = self.config.clamp_scale(self.config.default_scale);
            self.state.pan = vector(0.0, 0.0);
            self.render();
            return Some(FitOutcome::Abandoned);
        }
        self.pending_fit = Some(PendingFit { attempts });
        Some(FitOutcome::Deferred { attempt: attempts })
    }

    fn fit(&mut self) -> FitOutcome {
        let Some(viewport) = self.surface.viewport_size() else {
            return FitOutcome::Unavailable;
        };
        let Some(viewport) = positive_size(viewport.width, viewport.height) else {
            tracing::debug!("viewport not measurable yet; deferring fit");
            self.pending_fit = Some(PendingFit { attempts: 0 });
            return FitOutcome::Deferred { attempt: 0 };
        };

        let scale = self.fit_scale(viewport);
        self.state.scale = scale;
        self.state.pan = match self.state.content {
            Some(content) => vector(
                (viewport.width - content.width * scale) / 2.0,
                (viewport.height - content.height * scale) / 2.0,
            ),
            None => vector(0.0, 0.0),
        };
        self.render();
        FitOutcome::Applied { scale }
    }

    /// Largest scale (never above 100%) at which the content fits inside the viewport minus
    /// the margin.
    pub fn fit_scale(&self, viewport: Size) -> f64 {
        let Some(content) = self.state.content else {
            return self.config.clamp_scale(self.config.default_scale);
        };
        let margin = self.config.fit_margin;
        let scale = ((viewport.width - margin) / content.width)
            .min((viewport.height - margin) / content.height)
            .min(1.0);
        if scale.is_finite() {
            scale.max(self.config.zoom_min)
        } else {
            self.config.zoom_min
        }
    }

    /// Scales by one step while keeping the content point under `pivot` stationary.
    /// Returns whether the scale changed.
    pub fn zoom_at(&mut self, direction: ZoomDirection, pivot: Point) -> bool {
        if self.surface.viewport_size().is_none() || !is_finite_point(pivot) {
            return false;
        }
        let step = match direction {
            ZoomDirection::In => self.config.zoom_in_step,
            ZoomDirection::Out => self.config.zoom_out_step,
        };
        let old = self.state.scale;
        let new = self.config.clamp_scale(old * step);
        if new == old {
            return false;
        }
        let ratio = new / old;
        let pivot = pivot.to_vector();
        self.state.pan = pivot - (pivot - self.state.pan) * ratio;
        self.state.scale = new;
        tracing::trace!(scale = new, "zoom");
        self.render();
        true
    }

    /// Mouse wheel: negative `delta_y` zooms in, positive zooms out. `pointer` is relative to
    /// the viewport's top-left corner.
    pub fn wheel(&mut self, delta_y: f64, pointer: Point) -> bool {
        if delta_y < 0.0 {
            self.zoom_at(ZoomDirection::In, pointer)
        } else if delta_y > 0.0 {
            self.zoom_at(ZoomDirection::Out, pointer)
        } else {
            false
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at_center(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at_center(ZoomDirection::Out)
    }

    fn zoom_at_center(&mut self, direction: ZoomDirection) -> bool {
        let Some(viewport) = self.surface.viewport_size() else {
            return false;
        };
        self.zoom_at(direction, point(viewport.width / 2.0, viewport.height / 2.0))
    }

    /// Dispatches a zoom button. Buttons missing from [`Controls`] do nothing.
    pub fn press_control(&mut self, control: Control) -> bool {
        if !self.controls.has(control) {
            return false;
        }
        match control {
            Control::ZoomIn => self.zoom_in(),
            Control::ZoomOut => self.zoom_out(),
            Control::Reset => matches!(self.reset_to_fit(), FitOutcome::Applied { .. }),
        }
    }

    pub fn begin_pan(&mut self, pointer: Point) {
        if self.surface.viewport_size().is_none() || !is_finite_point(pointer) {
            return;
        }
        self.state.gesture.press(pointer, self.state.pan);
    }

    pub fn continue_pan(&mut self, pointer: Point) {
        if !is_finite_point(pointer) {
            return;
        }
        let threshold = self.config.drag_threshold;
        if let Some(pan) = self.state.gesture.move_to(pointer, threshold) {
            self.state.pan = pan;
            self.render();
        }
    }

    pub fn end_pan(&mut self) {
        self.state.gesture.release();
    }

    pub fn cancel_pan(&mut self) {
        self.state.gesture.cancel();
    }

    /// Whether a click arriving now should navigate (no drag since the last press).
    pub fn allows_click(&self) -> bool {
        self.state.gesture.allows_click()
    }

    pub fn screen_to_content(&self, screen: Point) -> Point {
        ((screen.to_vector() - self.state.pan) / self.state.scale).to_point()
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        (content.to_vector() * self.state.scale + self.state.pan).to_point()
    }

    pub fn render(&mut self) {
        if self.surface.viewport_size().is_none() {
            return;
        }
        let transform = self.state.transform();
        self.surface.apply_transform(&transform);
        if self.controls.readout {
            self.surface.set_readout(&transform.readout());
        }
    }
}

fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
