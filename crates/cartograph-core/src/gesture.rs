//! Press / drag / release disambiguation for the viewport.
//!
//! A press that travels no further than the drag threshold stays a click candidate; once the
//! pointer moves past it the gesture becomes a drag and the click that follows the release is
//! suppressed. The click handler reads the state at click time, there is no timer involved.

use crate::geom::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Idle {
        /// Whether the last completed press turned into a drag.
        dragged: bool,
    },
    Pressed {
        anchor: Point,
        pan_at_press: Vector,
    },
    Dragging {
        anchor: Point,
        pan_at_press: Vector,
    },
}

impl Default for PointerGesture {
    fn default() -> Self {
        Self::Idle { dragged: false }
    }
}

impl PointerGesture {
    pub fn press(&mut self, pointer: Point, pan: Vector) {
        *self = Self::Pressed {
            anchor: pointer,
            pan_at_press: pan,
        };
    }

    /// Advances the gesture and returns the pan implied by the cumulative pointer delta since
    /// the press, or `None` when no press is active.
    pub fn move_to(&mut self, pointer: Point, threshold: f64) -> Option<Vector> {
        match *self {
            Self::Idle { .. } => None,
            Self::Pressed {
                anchor,
                pan_at_press,
            } => {
                let delta = pointer - anchor;
                if delta.length() > threshold {
                    *self = Self::Dragging {
                        anchor,
                        pan_at_press,
                    };
                }
                Some(pan_at_press + delta)
            }
            Self::Dragging {
                anchor,
                pan_at_press,
            } => Some(pan_at_press + (pointer - anchor)),
        }
    }

    pub fn release(&mut self) {
        let dragged = match *self {
            Self::Idle { dragged } => dragged,
            Self::Pressed { .. } => false,
            Self::Dragging { .. } => true,
        };
        *self = Self::Idle { dragged };
    }

    /// Pointer left the viewport or capture was lost mid-gesture.
    pub fn cancel(&mut self) {
        self.release();
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self, Self::Idle { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn allows_click(&self) -> bool {
        match *self {
            Self::Idle { dragged } => !dragged,
            Self::Pressed { .. } => true,
            Self::Dragging { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{point, vector};

    #[test]
    fn short_press_keeps_click() {
        let mut g = PointerGesture::default();
        g.press(point(100.0, 100.0), vector(0.0, 0.0));
        assert_eq!(g.move_to(point(102.0, 100.0), 5.0), Some(vector(2.0, 0.0)));
        g.release();
        assert!(g.allows_click());
    }

    #[test]
    fn long_drag_suppresses_click_until_next_press() {
        let mut g = PointerGesture::default();
        g.press(point(0.0, 0.0), vector(10.0, 10.0));
        assert_eq!(g.move_to(point(6.0, 8.0), 5.0), Some(vector(16.0, 18.0)));
        assert!(g.is_dragging());
        g.release();
        assert!(!g.allows_click());

        g.press(point(0.0, 0.0), vector(0.0, 0.0));
        assert!(g.allows_click());
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut g = PointerGesture::default();
        g.press(point(0.0, 0.0), vector(0.0, 0.0));
        g.move_to(point(3.0, 4.0), 5.0);
        assert!(!g.is_dragging());
    }

    #[test]
    fn drag_stays_a_drag_when_pointer_returns() {
        let mut g = PointerGesture::default();
        g.press(point(0.0, 0.0), vector(0.0, 0.0));
        g.move_to(point(10.0, 0.0), 5.0);
        assert_eq!(g.move_to(point(1.0, 0.0), 5.0), Some(vector(1.0, 0.0)));
        assert!(g.is_dragging());
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut g = PointerGesture::default();
        assert_eq!(g.move_to(point(50.0, 50.0), 5.0), None);
        g.cancel();
        assert!(g.allows_click());
    }
}
