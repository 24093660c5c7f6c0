//! Scene projection: a read-only draw list for the host renderer.
//!
//! This module never draws anything. It takes the current view, the object
//! feed and the interaction state and produces screen-space primitives in
//! layer order:
//!
//! 1. world grid lines that cross the map,
//! 2. revealed chunk outlines (inspector only),
//! 3. one marker per visible object, flagged when selected or hovered.
//!
//! Everything outside the map bounds (plus a small margin for markers) is
//! culled so the host can draw the list as-is.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::camera::{MapBounds, Point, Transform};
use crate::consts::{CULL_MARGIN_PX, MIN_GRID_SPACING_PX};
use crate::hit::ActiveTarget;
use crate::object::{KindVisibility, ObjectFeed, ObjectKind, Target};
use crate::reveal::ChunkCoord;

/// One object to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub target: Target,
    /// Screen position of the object center.
    pub screen: Point,
    pub selected: bool,
    pub hovered: bool,
}

impl Marker {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.target.kind
    }
}

/// A grid line segment in screen space, clipped to the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Screen rectangle of one revealed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkOutline {
    pub chunk: ChunkCoord,
    pub min: Point,
    pub max: Point,
}

/// Everything the host needs to draw one frame of the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub grid_lines: Vec<GridLine>,
    pub chunk_outlines: Vec<ChunkOutline>,
    pub markers: Vec<Marker>,
}

/// Inputs to [`project`].
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub transform: &'a Transform,
    pub feed: &'a ObjectFeed,
    pub visibility: &'a KindVisibility,
    pub selection: &'a ActiveTarget,
    pub hover: &'a ActiveTarget,
    pub grid_size: f64,
    /// Revealed chunks to outline; empty outside the inspector.
    pub revealed_chunks: &'a [ChunkCoord],
    pub chunk_size: f64,
}

/// Build the draw list for one frame.
#[must_use]
pub fn project(input: &SceneInput<'_>) -> Scene {
    let t = input.transform;
    Scene {
        grid_lines: grid_lines(t, input.grid_size),
        chunk_outlines: chunk_outlines(t, input.revealed_chunks, input.chunk_size),
        markers: markers(input),
    }
}

// =============================================================
// Layers
// =============================================================

fn markers(input: &SceneInput<'_>) -> Vec<Marker> {
    let t = input.transform;
    let cull = expand(t.bounds, CULL_MARGIN_PX);
    input
        .feed
        .iter()
        .filter(|obj| input.visibility.is_visible(obj.kind()))
        .filter_map(|obj| {
            let screen = t.world_to_screen(obj.position()?);
            if !cull.contains(screen) {
                return None;
            }
            let target = Target::of(obj);
            Some(Marker { target, screen, selected: input.selection.is(&target), hovered: input.hover.is(&target) })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn grid_lines(t: &Transform, grid_size: f64) -> Vec<GridLine> {
    if grid_size <= 0.0 || t.world_dist_to_screen(grid_size) < MIN_GRID_SPACING_PX {
        return Vec::new();
    }
    let b = t.bounds;
    let (min, max) = t.visible_world_rect();
    let mut lines = Vec::new();

    for i in (min.x / grid_size).ceil() as i64..=(max.x / grid_size).floor() as i64 {
        let x = t.world_to_screen(Point::new(i as f64 * grid_size, 0.0)).x;
        lines.push(GridLine { from: Point::new(x, b.y), to: Point::new(x, b.y + b.height) });
    }
    for j in (min.y / grid_size).ceil() as i64..=(max.y / grid_size).floor() as i64 {
        let y = t.world_to_screen(Point::new(0.0, j as f64 * grid_size)).y;
        lines.push(GridLine { from: Point::new(b.x, y), to: Point::new(b.x + b.width, y) });
    }
    lines
}

fn chunk_outlines(t: &Transform, chunks: &[ChunkCoord], chunk_size: f64) -> Vec<ChunkOutline> {
    let b = t.bounds;
    chunks
        .iter()
        .filter_map(|&chunk| {
            let origin = chunk.origin(chunk_size);
            let min = t.world_to_screen(origin);
            let max = t.world_to_screen(Point::new(origin.x + chunk_size, origin.y + chunk_size));
            let overlaps = max.x >= b.x && min.x <= b.x + b.width && max.y >= b.y && min.y <= b.y + b.height;
            overlaps.then_some(ChunkOutline { chunk, min, max })
        })
        .collect()
}

fn expand(b: MapBounds, margin: f64) -> MapBounds {
    MapBounds::new(b.x - margin, b.y - margin, b.width + 2.0 * margin, b.height + 2.0 * margin)
}
