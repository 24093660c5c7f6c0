#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::GRID_CELLS_PER_VIEW;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The screen-space rectangle the map overlay is drawn into (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MapBounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Whether `pt` lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }

    /// Screen-space center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// World/map coordinate conversion for one view configuration.
///
/// Built fresh whenever the view or the map bounds change; it is cheap and
/// holds no references. The short side of the map always spans
/// `base_grid_size * 4 / zoom` world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space point drawn at the center of the map.
    pub center: Point,
    pub zoom: f64,
    pub bounds: MapBounds,
    /// Screen pixels per world unit.
    pub scale: f64,
}

impl Transform {
    #[must_use]
    pub fn new(center: Point, zoom: f64, bounds: MapBounds, base_grid_size: f64) -> Self {
        Self { center, zoom, bounds, scale: scale_for(zoom, &bounds, base_grid_size) }
    }

    /// Convert a world-space point to map (screen) coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let origin = self.bounds.center();
        Point {
            x: origin.x + (world.x - self.center.x) * self.scale,
            y: origin.y + (world.y - self.center.y) * self.scale,
        }
    }

    /// Convert a map (screen) point back to world coordinates.
    ///
    /// A degenerate (zero-area) map has no inverse; every point maps to the view center.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        if self.scale <= 0.0 {
            return self.center;
        }
        let origin = self.bounds.center();
        Point {
            x: self.center.x + (screen.x - origin.x) / self.scale,
            y: self.center.y + (screen.y - origin.y) / self.scale,
        }
    }

    /// Convert a screen-space pointer delta into the matching world-space offset.
    #[must_use]
    pub fn screen_delta_to_world(&self, dx: f64, dy: f64) -> Point {
        if self.scale <= 0.0 {
            return Point::default();
        }
        Point::new(dx / self.scale, dy / self.scale)
    }

    /// Convert a world-space distance to screen pixels.
    #[must_use]
    pub fn world_dist_to_screen(&self, world_dist: f64) -> f64 {
        world_dist * self.scale
    }

    /// World-space corners `(min, max)` of the area currently covered by the map.
    #[must_use]
    pub fn visible_world_rect(&self) -> (Point, Point) {
        let b = self.bounds;
        let a = self.screen_to_world(Point::new(b.x, b.y));
        let c = self.screen_to_world(Point::new(b.x + b.width, b.y + b.height));
        (Point::new(a.x.min(c.x), a.y.min(c.y)), Point::new(a.x.max(c.x), a.y.max(c.y)))
    }
}

/// Screen pixels per world unit for `zoom` inside `bounds`.
#[must_use]
pub fn scale_for(zoom: f64, bounds: &MapBounds, base_grid_size: f64) -> f64 {
    let world_span = base_grid_size * GRID_CELLS_PER_VIEW / zoom;
    if world_span <= 0.0 || !world_span.is_finite() {
        return 0.0;
    }
    bounds.short_side().max(0.0) / world_span
}
