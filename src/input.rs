//! Input model: decoded pointer/keyboard signals and the drag state machine.
//!
//! The host decodes raw DOM or touch events and hands the map already-typed
//! signals: a [`Button`], a [`WheelDelta`], a pinch scale, or a [`Key`].
//! [`DragState`] is the gesture being tracked between pointer-down and
//! pointer-up; it distinguishes a press that has not yet moved far enough to
//! count as a pan from an active pan.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"+"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Cursor hint for the host to apply to the map element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// Map hidden, or pointer outside the map.
    #[default]
    Default,
    /// Pointer over empty map space.
    Crosshair,
    /// Pointer over an interactive object.
    Pointer,
}

impl Cursor {
    /// CSS cursor keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Crosshair => "crosshair",
            Self::Pointer => "pointer",
        }
    }
}

/// Gesture tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No pointer pressed inside the map.
    #[default]
    Idle,
    /// Pointer pressed inside the map but has not moved past the drag threshold.
    Tracking {
        /// Screen point where the press started.
        press: Point,
        /// Screen point of the previous pointer event.
        last: Point,
    },
    /// Pointer is dragging the map.
    Panning {
        /// Screen point of the previous pointer event, used to compute the pan delta.
        last: Point,
    },
}

impl DragState {
    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
