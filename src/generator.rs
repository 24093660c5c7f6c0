//! Procedural generator seam.
//!
//! DESIGN
//! ======
//! The map never generates content itself. It asks a [`RegionGenerator`] for
//! the objects around a world point, one chunk at a time, and caches the
//! answer. Implementations must be deterministic in `(seed, center,
//! chunk_radius)`; the cache relies on that to never regenerate a chunk.
//!
//! [`SeededGenerator`] is a self-contained implementation used by the
//! inspector CLI and tests. It derives one RNG per chunk from the seed and the
//! chunk coordinate, so any chunk can be produced independently of its
//! neighbours.

#[cfg(test)]
#[path = "generator_test.rs"]
mod generator_test;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::camera::Point;
use crate::object::{MapObject, ObjectBody, ObjectKind};
use crate::reveal::{ChunkCoord, Seed};

/// Errors produced by a region generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The generator cannot serve requests right now.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// Generating one region failed.
    #[error("region generation failed at ({x}, {y}): {reason}")]
    Failed { x: f64, y: f64, reason: String },
}

/// Deterministic source of procedural map objects.
#[async_trait]
pub trait RegionGenerator: Send + Sync {
    /// All objects in the chunks within `chunk_radius` of the chunk containing `center`.
    ///
    /// The cache always calls this with `chunk_radius == 0` and the center of
    /// the chunk it wants.
    async fn region_objects(
        &self,
        seed: Seed,
        center: Point,
        chunk_radius: u32,
    ) -> Result<Vec<MapObject>, GenerationError>;
}

const SPECTRAL_CLASSES: [&str; 7] = ["O", "B", "A", "F", "G", "K", "M"];
const PLANET_TYPES: [&str; 6] = ["rocky", "ocean", "gas", "ice", "lava", "desert"];
const NEBULA_TYPES: [&str; 3] = ["emission", "reflection", "planetary"];
const GARDEN_TYPES: [&str; 3] = ["metallic", "icy", "carbonaceous"];
const ROGUE_VARIANTS: [&str; 3] = ["frozen", "volcanic", "barren"];
const CRYSTAL_TYPES: [&str; 3] = ["quartz", "amethyst", "prismatic"];
const PROTOSTAR_STAGES: [&str; 3] = ["collapsing", "accreting", "igniting"];

/// Chance that a chunk contains each of the rarer kinds.
const RARE_ODDS: [(ObjectKind, f64); 8] = [
    (ObjectKind::Nebula, 0.25),
    (ObjectKind::Wormhole, 0.04),
    (ObjectKind::AsteroidGarden, 0.15),
    (ObjectKind::BlackHole, 0.02),
    (ObjectKind::RoguePlanet, 0.1),
    (ObjectKind::DarkNebula, 0.12),
    (ObjectKind::CrystalGarden, 0.06),
    (ObjectKind::Protostar, 0.08),
];

/// A deterministic [`RegionGenerator`] driven by `rand`'s `StdRng`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeededGenerator {
    chunk_size: f64,
    /// Upper bound on star systems per chunk.
    max_systems: u32,
    /// Ambient background stars per chunk.
    background_stars: u32,
}

impl SeededGenerator {
    #[must_use]
    pub fn new(chunk_size: f64) -> Self {
        Self { chunk_size, max_systems: 3, background_stars: 8 }
    }

    #[must_use]
    pub fn with_max_systems(mut self, max_systems: u32) -> Self {
        self.max_systems = max_systems;
        self
    }

    #[must_use]
    pub fn with_background_stars(mut self, background_stars: u32) -> Self {
        self.background_stars = background_stars;
        self
    }

    /// Every object in a single chunk. Same inputs, same output.
    #[must_use]
    pub fn chunk_objects(&self, seed: Seed, chunk: ChunkCoord) -> Vec<MapObject> {
        let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk));
        let origin = chunk.origin(self.chunk_size);
        let size = self.chunk_size;
        let mut objects = Vec::new();

        let place = |rng: &mut StdRng| Point::new(origin.x + rng.random_range(0.0..size), origin.y + rng.random_range(0.0..size));

        let systems = rng.random_range(0..=self.max_systems);
        for _ in 0..systems {
            let star_pos = place(&mut rng);
            let star_id = next_id(&mut rng);
            let class = pick(&mut rng, &SPECTRAL_CLASSES);
            objects.push(MapObject::new(
                star_id,
                star_pos.x,
                star_pos.y,
                ObjectBody::CelestialStar { spectral_class: class.into(), radius: rng.random_range(20.0..60.0) },
            ));

            for _ in 0..rng.random_range(0..=4u32) {
                let angle = rng.random_range(0.0..std::f64::consts::TAU);
                let orbit = rng.random_range(60.0..(size / 8.0).max(61.0));
                objects.push(MapObject::new(
                    next_id(&mut rng),
                    star_pos.x + orbit * angle.cos(),
                    star_pos.y + orbit * angle.sin(),
                    ObjectBody::Planet {
                        planet_type: pick(&mut rng, &PLANET_TYPES).into(),
                        radius: rng.random_range(4.0..18.0),
                        parent_star: Some(star_id),
                    },
                ));
            }

            if rng.random_bool(0.3) {
                let angle = rng.random_range(0.0..std::f64::consts::TAU);
                let orbit = rng.random_range(80.0..(size / 6.0).max(81.0));
                objects.push(MapObject::new(
                    next_id(&mut rng),
                    star_pos.x + orbit * angle.cos(),
                    star_pos.y + orbit * angle.sin(),
                    ObjectBody::Comet { parent_star: Some(star_id), tail_length: rng.random_range(10.0..40.0) },
                ));
            }
        }

        for (kind, odds) in RARE_ODDS {
            if !rng.random_bool(odds) {
                continue;
            }
            let pos = place(&mut rng);
            let id = next_id(&mut rng);
            objects.push(MapObject::new(id, pos.x, pos.y, rare_body(kind, &mut rng)));
        }

        for _ in 0..self.background_stars {
            let pos = place(&mut rng);
            objects.push(MapObject::new(
                next_id(&mut rng),
                pos.x,
                pos.y,
                ObjectBody::BackgroundStar { brightness: rng.random_range(0.1..1.0) },
            ));
        }

        objects
    }
}

#[async_trait]
impl RegionGenerator for SeededGenerator {
    async fn region_objects(
        &self,
        seed: Seed,
        center: Point,
        chunk_radius: u32,
    ) -> Result<Vec<MapObject>, GenerationError> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(GenerationError::Unavailable(format!("invalid chunk size {}", self.chunk_size)));
        }
        let middle = ChunkCoord::containing(center, self.chunk_size);
        Ok(middle.neighborhood(chunk_radius).flat_map(|chunk| self.chunk_objects(seed, chunk)).collect())
    }
}

fn rare_body(kind: ObjectKind, rng: &mut StdRng) -> ObjectBody {
    match kind {
        ObjectKind::Nebula => ObjectBody::Nebula {
            nebula_type: pick(rng, &NEBULA_TYPES).into(),
            radius: rng.random_range(150.0..400.0),
        },
        ObjectKind::Wormhole => ObjectBody::Wormhole { designation: format!("WH-{:04}", rng.random_range(0..10_000u32)), twin: None },
        ObjectKind::AsteroidGarden => ObjectBody::AsteroidGarden {
            garden_type: pick(rng, &GARDEN_TYPES).into(),
            radius: rng.random_range(40.0..120.0),
        },
        ObjectKind::BlackHole => ObjectBody::BlackHole { event_horizon: rng.random_range(10.0..40.0) },
        ObjectKind::RoguePlanet => ObjectBody::RoguePlanet {
            variant: pick(rng, &ROGUE_VARIANTS).into(),
            radius: rng.random_range(4.0..14.0),
        },
        ObjectKind::DarkNebula => ObjectBody::DarkNebula { radius: rng.random_range(200.0..500.0) },
        ObjectKind::CrystalGarden => ObjectBody::CrystalGarden {
            crystal_type: pick(rng, &CRYSTAL_TYPES).into(),
            radius: rng.random_range(30.0..90.0),
        },
        ObjectKind::Protostar => ObjectBody::Protostar {
            stage: pick(rng, &PROTOSTAR_STAGES).into(),
            radius: rng.random_range(15.0..45.0),
        },
        ObjectKind::CelestialStar | ObjectKind::Planet | ObjectKind::Comet | ObjectKind::BackgroundStar => {
            ObjectBody::BackgroundStar { brightness: rng.random_range(0.1..1.0) }
        }
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.random_range(0..options.len())]
}

fn next_id(rng: &mut StdRng) -> Uuid {
    Uuid::from_u64_pair(rng.random(), rng.random())
}

/// Mix the universe seed and chunk coordinate into one RNG seed (splitmix64 finalizer).
#[allow(clippy::cast_sign_loss)]
fn chunk_seed(seed: Seed, chunk: ChunkCoord) -> u64 {
    let mut z = seed
        ^ (chunk.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (chunk.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
