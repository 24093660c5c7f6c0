//! Pointer disambiguation: which object a click selects and which one the pointer hovers.
//!
//! Both resolvers work in screen space. Each object kind has a [`TypeConfig`]
//! giving its priority (lower wins), a pixel threshold, an optional zoom gate,
//! and whether its coordinates may legitimately be unresolved. Clicks and
//! hovers use separate tables: see [`InteractionTable::selection`] and
//! [`InteractionTable::hover`].
//!
//! The two resolvers decide differently on purpose:
//!
//! - **Selection** collects the nearest in-threshold candidate of *every*
//!   kind and then picks the lowest priority, breaking ties by distance.
//! - **Hover** walks kinds in priority order and stops at the first kind that
//!   has any in-threshold object, even if a later kind has something closer.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use tracing::warn;

use crate::camera::{Point, Transform};
use crate::object::{KindVisibility, MapObject, ObjectFeed, ObjectKind, Target};

/// Interaction rules for one object kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeConfig {
    pub kind: ObjectKind,
    /// Lower values take precedence.
    pub priority: u8,
    /// Maximum pointer distance in screen pixels.
    pub threshold_px: f64,
    /// Kind is ignored while the zoom level is below this value.
    pub min_zoom: Option<f64>,
    /// Objects of this kind may arrive without coordinates.
    pub requires_null_check: bool,
}

impl TypeConfig {
    #[must_use]
    pub const fn new(kind: ObjectKind, priority: u8, threshold_px: f64) -> Self {
        Self { kind, priority, threshold_px, min_zoom: None, requires_null_check: false }
    }

    #[must_use]
    pub const fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = Some(zoom);
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.requires_null_check = true;
        self
    }

    /// Whether this kind takes part in interaction at `zoom`.
    #[must_use]
    pub fn active_at(&self, zoom: f64) -> bool {
        self.min_zoom.is_none_or(|min| zoom >= min)
    }
}

/// Click-resolution table.
///
/// Thresholds here are intentionally looser than the hover table for several
/// kinds; the two tables are tuned independently.
const SELECTION_TABLE: [TypeConfig; 11] = [
    TypeConfig::new(ObjectKind::Planet, 1, 10.0),
    TypeConfig::new(ObjectKind::CelestialStar, 2, 15.0),
    TypeConfig::new(ObjectKind::BlackHole, 3, 25.0).nullable(),
    TypeConfig::new(ObjectKind::Wormhole, 4, 20.0).nullable(),
    TypeConfig::new(ObjectKind::Protostar, 5, 15.0),
    TypeConfig::new(ObjectKind::RoguePlanet, 6, 12.0).with_min_zoom(0.05),
    TypeConfig::new(ObjectKind::CrystalGarden, 7, 18.0).with_min_zoom(0.05),
    TypeConfig::new(ObjectKind::Comet, 8, 15.0).nullable(),
    TypeConfig::new(ObjectKind::AsteroidGarden, 9, 20.0).with_min_zoom(0.1),
    TypeConfig::new(ObjectKind::Nebula, 10, 30.0),
    TypeConfig::new(ObjectKind::DarkNebula, 11, 30.0),
];

/// Hover-resolution table.
const HOVER_TABLE: [TypeConfig; 11] = [
    TypeConfig::new(ObjectKind::Planet, 1, 10.0),
    TypeConfig::new(ObjectKind::CelestialStar, 2, 12.0),
    TypeConfig::new(ObjectKind::BlackHole, 3, 18.0).nullable(),
    TypeConfig::new(ObjectKind::Wormhole, 4, 12.0).nullable(),
    TypeConfig::new(ObjectKind::Protostar, 5, 12.0),
    TypeConfig::new(ObjectKind::RoguePlanet, 6, 10.0).with_min_zoom(0.05),
    TypeConfig::new(ObjectKind::CrystalGarden, 7, 14.0).with_min_zoom(0.05),
    TypeConfig::new(ObjectKind::Comet, 8, 10.0).nullable(),
    TypeConfig::new(ObjectKind::AsteroidGarden, 9, 15.0).with_min_zoom(0.1),
    TypeConfig::new(ObjectKind::Nebula, 10, 25.0),
    TypeConfig::new(ObjectKind::DarkNebula, 11, 25.0),
];

/// A set of per-kind interaction rules, kept sorted by ascending priority.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTable {
    configs: Vec<TypeConfig>,
}

impl InteractionTable {
    /// Build a table from arbitrary configs. Order among equal priorities is preserved.
    #[must_use]
    pub fn new(mut configs: Vec<TypeConfig>) -> Self {
        configs.sort_by_key(|c| c.priority);
        Self { configs }
    }

    /// The table used to resolve clicks.
    #[must_use]
    pub fn selection() -> Self {
        Self::new(SELECTION_TABLE.to_vec())
    }

    /// The table used to resolve hovering.
    #[must_use]
    pub fn hover() -> Self {
        Self::new(HOVER_TABLE.to_vec())
    }

    #[must_use]
    pub fn get(&self, kind: ObjectKind) -> Option<&TypeConfig> {
        self.configs.iter().find(|c| c.kind == kind)
    }

    /// Configs in ascending priority order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeConfig> {
        self.configs.iter()
    }
}

/// The nearest in-threshold object of one kind.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub object: &'a MapObject,
    pub priority: u8,
    /// Screen-space distance from the pointer, in pixels.
    pub distance: f64,
}

impl Candidate<'_> {
    #[must_use]
    pub fn target(&self) -> Target {
        Target::of(self.object)
    }
}

/// Result of resolving a click.
#[derive(Debug, Clone, Copy)]
pub enum SelectionOutcome<'a> {
    /// The click landed outside the map. Selection is cleared and the click is not consumed.
    OutOfBounds,
    /// The click landed on empty map space. Selection is cleared and the click is consumed.
    Empty,
    /// The click selected an object.
    Selected(Candidate<'a>),
}

impl SelectionOutcome<'_> {
    /// Whether the map consumed the click.
    #[must_use]
    pub fn handled(&self) -> bool {
        !matches!(self, Self::OutOfBounds)
    }

    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::Selected(c) => Some(c.target()),
            Self::OutOfBounds | Self::Empty => None,
        }
    }
}

/// Find the nearest object of `config.kind` within its threshold of `pointer`.
///
/// Objects without coordinates are skipped. For kinds that are not expected
/// to have unresolved coordinates this indicates a broken feed and is logged.
#[must_use]
pub fn nearest_within<'a>(
    config: &TypeConfig,
    objects: &'a [MapObject],
    pointer: Point,
    transform: &Transform,
) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for object in objects {
        let Some(world) = object.position() else {
            if !config.requires_null_check {
                warn!(kind = %config.kind, id = %object.id, "map object missing coordinates");
            }
            continue;
        };
        let distance = transform.world_to_screen(world).distance_to(pointer);
        if distance > config.threshold_px {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Candidate { object, priority: config.priority, distance });
        }
    }
    best
}

/// Resolve a click against every visible kind and pick the global best.
#[must_use]
pub fn resolve_selection<'a>(
    click: Point,
    transform: &Transform,
    feed: &'a ObjectFeed,
    table: &InteractionTable,
    visibility: &KindVisibility,
) -> SelectionOutcome<'a> {
    if !transform.bounds.contains(click) {
        return SelectionOutcome::OutOfBounds;
    }

    let candidates = table
        .iter()
        .filter(|cfg| cfg.active_at(transform.zoom) && visibility.is_visible(cfg.kind))
        .filter_map(|cfg| nearest_within(cfg, feed.objects(cfg.kind), click, transform));

    let best = candidates.min_by(|a, b| a.priority.cmp(&b.priority).then(a.distance.total_cmp(&b.distance)));
    match best {
        Some(c) => SelectionOutcome::Selected(c),
        None => SelectionOutcome::Empty,
    }
}

/// Resolve hovering: the first kind in priority order with any match wins.
///
/// Returns `None` when the pointer is outside the map or nothing is in range.
#[must_use]
pub fn resolve_hover<'a>(
    pointer: Point,
    transform: &Transform,
    feed: &'a ObjectFeed,
    table: &InteractionTable,
    visibility: &KindVisibility,
) -> Option<Candidate<'a>> {
    if !transform.bounds.contains(pointer) {
        return None;
    }
    table
        .iter()
        .filter(|cfg| cfg.active_at(transform.zoom) && visibility.is_visible(cfg.kind))
        .find_map(|cfg| nearest_within(cfg, feed.objects(cfg.kind), pointer, transform))
}

/// The single active selection or hover target across all kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTarget {
    target: Option<Target>,
}

impl ActiveTarget {
    #[must_use]
    pub fn get(&self) -> Option<Target> {
        self.target
    }

    #[must_use]
    pub fn is(&self, target: &Target) -> bool {
        self.target.as_ref() == Some(target)
    }

    /// Replace the target. Returns `true` if it changed.
    pub fn set(&mut self, target: Option<Target>) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }

    /// Clear the target. Returns `true` if something was cleared.
    pub fn clear(&mut self) -> bool {
        self.set(None)
    }
}
