//! View state: zoom level, pan center, camera-follow, and the pan gesture.
//!
//! `ViewState` is created once per map controller and lives across map
//! visibility toggles. Zoom is always clamped to the active [`ZoomRange`];
//! the inspector can widen that range, and narrowing it again re-clamps the
//! current zoom.
//!
//! Panning is a three-state machine (see [`DragState`]): a press inside the
//! map starts tracking, moving more than the drag threshold from the press
//! point starts a pan (and disengages camera-follow), and release returns to
//! idle. Pan deltas are converted to world space through the inverse of the
//! current [`Transform`] and subtracted from the center.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use crate::camera::{MapBounds, Point, Transform};
use crate::config::MapConfig;
use crate::consts::{MAX_ZOOM, MAX_ZOOM_EXTENDED, MIN_ZOOM, MIN_ZOOM_EXTENDED};
use crate::input::DragState;

/// Inclusive zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const NORMAL: ZoomRange = ZoomRange { min: MIN_ZOOM, max: MAX_ZOOM };
    pub const EXTENDED: ZoomRange = ZoomRange { min: MIN_ZOOM_EXTENDED, max: MAX_ZOOM_EXTENDED };

    #[must_use]
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// Pan/zoom state of the map.
#[derive(Debug, Clone)]
pub struct ViewState {
    zoom_level: f64,
    center: Point,
    follow_player: bool,
    drag: DragState,
    extended_range: bool,
    zoom_step: f64,
    drag_threshold_px: f64,
    base_grid_size: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(&MapConfig::default())
    }
}

impl ViewState {
    /// A view centered on the world origin at zoom 1.0, following the player.
    #[must_use]
    pub fn new(config: &MapConfig) -> Self {
        Self {
            zoom_level: 1.0,
            center: Point::default(),
            follow_player: true,
            drag: DragState::Idle,
            extended_range: false,
            zoom_step: config.zoom_step,
            drag_threshold_px: config.drag_threshold_px,
            base_grid_size: config.base_grid_size,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn follow_player(&self) -> bool {
        self.follow_player
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.drag.is_panning()
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn zoom_range(&self) -> ZoomRange {
        if self.extended_range { ZoomRange::EXTENDED } else { ZoomRange::NORMAL }
    }

    #[must_use]
    pub fn extended_range(&self) -> bool {
        self.extended_range
    }

    /// The coordinate transform for this view inside `bounds`.
    #[must_use]
    pub fn transform(&self, bounds: MapBounds) -> Transform {
        Transform::new(self.center, self.zoom_level, bounds, self.base_grid_size)
    }

    // --- Zoom ---

    /// Switch between the normal and extended zoom ranges, re-clamping the current zoom.
    pub fn set_extended_range(&mut self, extended: bool) {
        self.extended_range = extended;
        self.zoom_level = self.zoom_range().clamp(self.zoom_level);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.zoom_step);
    }

    /// Multiply the zoom level by `factor`, clamped to the active range.
    /// Non-finite or non-positive factors are ignored.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.set_zoom(self.zoom_level * factor);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.zoom_level = self.zoom_range().clamp(zoom);
    }

    // --- Center / follow ---

    /// Move the view center without touching the follow flag.
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Engage camera-follow and recenter on the player immediately.
    pub fn enable_follow_player(&mut self, player: Point) {
        self.follow_player = true;
        self.center = player;
    }

    pub fn disable_follow_player(&mut self) {
        self.follow_player = false;
    }

    /// Per-tick follow update. Returns `true` if the center moved.
    pub fn follow_tick(&mut self, player: Option<Point>) -> bool {
        if !self.follow_player || self.is_panning() {
            return false;
        }
        let Some(player) = player else {
            return false;
        };
        if self.center == player {
            return false;
        }
        self.center = player;
        true
    }

    // --- Pan gesture ---

    /// Pointer pressed. Starts tracking when idle and `pt` is inside `bounds`.
    /// Returns `true` if tracking started.
    pub fn pointer_down(&mut self, pt: Point, bounds: &MapBounds) -> bool {
        if !self.drag.is_idle() || !bounds.contains(pt) {
            return false;
        }
        self.drag = DragState::Tracking { press: pt, last: pt };
        true
    }

    /// Pointer moved. Promotes tracking to panning past the drag threshold and
    /// applies pan deltas. Returns `true` if the center moved.
    pub fn pointer_move(&mut self, pt: Point, bounds: MapBounds) -> bool {
        let last = match self.drag {
            DragState::Idle => return false,
            DragState::Tracking { press, last } => {
                if press.distance_to(pt) <= self.drag_threshold_px {
                    self.drag = DragState::Tracking { press, last: pt };
                    return false;
                }
                self.follow_player = false;
                last
            }
            DragState::Panning { last } => last,
        };

        self.drag = DragState::Panning { last: pt };
        let offset = self.transform(bounds).screen_delta_to_world(pt.x - last.x, pt.y - last.y);
        self.center = Point::new(self.center.x - offset.x, self.center.y - offset.y);
        pt != last
    }

    /// Pointer released. Returns to idle and reports the gesture that just ended.
    pub fn pointer_up(&mut self) -> DragState {
        std::mem::take(&mut self.drag)
    }

    /// Abandon any gesture in progress (e.g. when the map closes).
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }
}
