//! Object model: map object kinds, their per-kind payloads, and the per-tick feed.
//!
//! Every object the map can show is a [`MapObject`]: a stable id, an optional
//! world position, and an [`ObjectBody`] carrying only the fields relevant to
//! its category. The body's discriminant is the object's [`ObjectKind`]; the
//! interaction tables in [`crate::hit`] are indexed by that kind directly.
//!
//! Objects arrive from two places. The host supplies an [`ObjectFeed`] of
//! discovered objects every tick, and in inspector mode the revealed-chunk
//! cache supplies everything the procedural generator produced for visited
//! chunks.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a map object.
pub type ObjectId = Uuid;

/// Category of a map object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    CelestialStar,
    Planet,
    Nebula,
    Wormhole,
    AsteroidGarden,
    BlackHole,
    Comet,
    RoguePlanet,
    DarkNebula,
    CrystalGarden,
    Protostar,
    /// Ambient backdrop star. Never interactive and not counted in totals.
    BackgroundStar,
}

impl ObjectKind {
    /// Every kind, in declaration order.
    pub const ALL: [ObjectKind; 12] = [
        Self::CelestialStar,
        Self::Planet,
        Self::Nebula,
        Self::Wormhole,
        Self::AsteroidGarden,
        Self::BlackHole,
        Self::Comet,
        Self::RoguePlanet,
        Self::DarkNebula,
        Self::CrystalGarden,
        Self::Protostar,
        Self::BackgroundStar,
    ];

    /// The eleven kinds the pointer can select or hover.
    pub const INTERACTIVE: [ObjectKind; 11] = [
        Self::CelestialStar,
        Self::Planet,
        Self::Nebula,
        Self::Wormhole,
        Self::AsteroidGarden,
        Self::BlackHole,
        Self::Comet,
        Self::RoguePlanet,
        Self::DarkNebula,
        Self::CrystalGarden,
        Self::Protostar,
    ];

    /// Whether objects of this kind count toward view statistics totals.
    #[must_use]
    pub fn is_meaningful(self) -> bool {
        !matches!(self, Self::BackgroundStar)
    }

    /// The camelCase wire name (`"celestialStar"`, `"asteroidGarden"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CelestialStar => "celestialStar",
            Self::Planet => "planet",
            Self::Nebula => "nebula",
            Self::Wormhole => "wormhole",
            Self::AsteroidGarden => "asteroidGarden",
            Self::BlackHole => "blackHole",
            Self::Comet => "comet",
            Self::RoguePlanet => "roguePlanet",
            Self::DarkNebula => "darkNebula",
            Self::CrystalGarden => "crystalGarden",
            Self::Protostar => "protostar",
            Self::BackgroundStar => "backgroundStar",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind payload. The `kind` tag doubles as the object's category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectBody {
    #[serde(rename_all = "camelCase")]
    CelestialStar { spectral_class: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    Planet { planet_type: String, radius: f64, parent_star: Option<ObjectId> },
    #[serde(rename_all = "camelCase")]
    Nebula { nebula_type: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    Wormhole { designation: String, twin: Option<ObjectId> },
    #[serde(rename_all = "camelCase")]
    AsteroidGarden { garden_type: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    BlackHole { event_horizon: f64 },
    #[serde(rename_all = "camelCase")]
    Comet { parent_star: Option<ObjectId>, tail_length: f64 },
    #[serde(rename_all = "camelCase")]
    RoguePlanet { variant: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    DarkNebula { radius: f64 },
    #[serde(rename_all = "camelCase")]
    CrystalGarden { crystal_type: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    Protostar { stage: String, radius: f64 },
    #[serde(rename_all = "camelCase")]
    BackgroundStar { brightness: f64 },
}

impl ObjectBody {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::CelestialStar { .. } => ObjectKind::CelestialStar,
            Self::Planet { .. } => ObjectKind::Planet,
            Self::Nebula { .. } => ObjectKind::Nebula,
            Self::Wormhole { .. } => ObjectKind::Wormhole,
            Self::AsteroidGarden { .. } => ObjectKind::AsteroidGarden,
            Self::BlackHole { .. } => ObjectKind::BlackHole,
            Self::Comet { .. } => ObjectKind::Comet,
            Self::RoguePlanet { .. } => ObjectKind::RoguePlanet,
            Self::DarkNebula { .. } => ObjectKind::DarkNebula,
            Self::CrystalGarden { .. } => ObjectKind::CrystalGarden,
            Self::Protostar { .. } => ObjectKind::Protostar,
            Self::BackgroundStar { .. } => ObjectKind::BackgroundStar,
        }
    }
}

/// An object on the map, as supplied by the feed or the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: ObjectId,
    /// World x; `None` while the host has not resolved the object's position.
    #[serde(default)]
    pub x: Option<f64>,
    /// World y; `None` while the host has not resolved the object's position.
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(flatten)]
    pub body: ObjectBody,
}

impl MapObject {
    /// Create an object with a resolved world position.
    #[must_use]
    pub fn new(id: ObjectId, x: f64, y: f64, body: ObjectBody) -> Self {
        Self { id, x: Some(x), y: Some(y), body }
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.body.kind()
    }

    /// World position, if both coordinates are known.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Identifies one object across all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: ObjectKind,
    pub id: ObjectId,
}

impl Target {
    #[must_use]
    pub fn of(obj: &MapObject) -> Self {
        Self { kind: obj.kind(), id: obj.id }
    }
}

/// Per-kind collections of objects supplied by the host each tick.
///
/// Objects are bucketed by the kind of their body, so a collection can
/// never hold an object of the wrong category.
#[derive(Debug, Clone, Default)]
pub struct ObjectFeed {
    by_kind: HashMap<ObjectKind, Vec<MapObject>>,
}

impl ObjectFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feed from a flat list of objects.
    #[must_use]
    pub fn from_objects(objects: impl IntoIterator<Item = MapObject>) -> Self {
        let mut feed = Self::new();
        for obj in objects {
            feed.push(obj);
        }
        feed
    }

    /// Add one object to the bucket for its kind.
    pub fn push(&mut self, obj: MapObject) {
        self.by_kind.entry(obj.kind()).or_default().push(obj);
    }

    /// Replace one category wholesale, dropping any object whose kind does not match.
    pub fn set(&mut self, kind: ObjectKind, objects: Vec<MapObject>) {
        let objects: Vec<MapObject> = objects.into_iter().filter(|o| o.kind() == kind).collect();
        self.by_kind.insert(kind, objects);
    }

    /// All objects of one kind; empty when the host supplied none.
    #[must_use]
    pub fn objects(&self, kind: ObjectKind) -> &[MapObject] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Look up an object by target.
    #[must_use]
    pub fn get(&self, target: &Target) -> Option<&MapObject> {
        self.objects(target.kind).iter().find(|o| o.id == target.id)
    }

    /// Iterate every object across all kinds, in [`ObjectKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &MapObject> {
        ObjectKind::ALL.into_iter().flat_map(|k| self.objects(k).iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-kind visibility toggles.
///
/// Hidden kinds are filtered out of interaction and query results; the
/// underlying feed and cache are never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindVisibility {
    hidden: HashSet<ObjectKind>,
}

impl KindVisibility {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_visible(&self, kind: ObjectKind) -> bool {
        !self.hidden.contains(&kind)
    }

    pub fn set_visible(&mut self, kind: ObjectKind, visible: bool) {
        if visible {
            self.hidden.remove(&kind);
        } else {
            self.hidden.insert(kind);
        }
    }

    /// Flip one kind's visibility and return the new state.
    pub fn toggle(&mut self, kind: ObjectKind) -> bool {
        let visible = !self.is_visible(kind);
        self.set_visible(kind, visible);
        visible
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }
}
