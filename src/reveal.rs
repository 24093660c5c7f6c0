//! Seed-keyed cache of revealed chunks.
//!
//! DESIGN
//! ======
//! World space is cut into square chunks of `chunk_size` world units.
//! Revealing a neighborhood asks the generator for every chunk that is not
//! cached yet, one chunk per request, and commits each answer as soon as it
//! arrives. Entries are never overwritten and never evicted except by
//! [`RevealedChunkCache::clear_revealed_chunks`].
//!
//! The cache sits behind a `tokio::sync::RwLock` so several reveals can be
//! in progress at once. The lock is never held across a generator call.
//! Instead each chunk is claimed in a per-seed in-flight set before the
//! request and released (or committed) afterwards; a concurrent reveal that
//! meets a claimed chunk skips it. The in-flight set has its own sync mutex so
//! a reveal dropped mid-request releases its claim from `Drop`.

#[cfg(test)]
#[path = "reveal_test.rs"]
mod reveal_test;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::camera::Point;
use crate::config::MapConfig;
use crate::generator::RegionGenerator;
use crate::object::{KindVisibility, MapObject};

/// Universe seed.
pub type Seed = u64;

/// Cache handle shared between the controller and running reveals.
pub type SharedChunkCache = Arc<RwLock<RevealedChunkCache>>;

/// Integer chunk coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i64,
    pub y: i64,
}

impl ChunkCoord {
    pub const MIN: ChunkCoord = ChunkCoord { x: i64::MIN, y: i64::MIN };
    pub const MAX: ChunkCoord = ChunkCoord { x: i64::MAX, y: i64::MAX };

    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The chunk containing world point `pt` (floor division, so `-0.5` is in chunk `-1`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(pt: Point, chunk_size: f64) -> Self {
        Self { x: (pt.x / chunk_size).floor() as i64, y: (pt.y / chunk_size).floor() as i64 }
    }

    /// World position of the chunk's minimum corner.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn origin(self, chunk_size: f64) -> Point {
        Point::new(self.x as f64 * chunk_size, self.y as f64 * chunk_size)
    }

    /// World position of the chunk's center.
    #[must_use]
    pub fn center(self, chunk_size: f64) -> Point {
        let origin = self.origin(chunk_size);
        Point::new(origin.x + chunk_size / 2.0, origin.y + chunk_size / 2.0)
    }

    /// The `(2r+1)^2` chunks within Chebyshev distance `radius`, row by row.
    pub fn neighborhood(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = i64::from(radius);
        (-r..=r).flat_map(move |dy| {
            (-r..=r).map(move |dx| ChunkCoord::new(self.x.saturating_add(dx), self.y.saturating_add(dy)))
        })
    }
}

/// Number of chunks in a neighborhood of `radius`.
#[must_use]
pub fn neighborhood_size(radius: u32) -> usize {
    let side = 2 * u64::from(radius) + 1;
    side.checked_mul(side).map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX))
}

/// Composite cache key. Orders by seed first so one seed's chunks form a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub seed: Seed,
    pub chunk: ChunkCoord,
}

impl ChunkKey {
    fn seed_range(seed: Seed) -> RangeInclusive<ChunkKey> {
        ChunkKey { seed, chunk: ChunkCoord::MIN }..=ChunkKey { seed, chunk: ChunkCoord::MAX }
    }
}

/// Bookkeeping stored alongside each revealed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMeta {
    /// Unix milliseconds at which the chunk was committed.
    pub timestamp_ms: i64,
    pub seed: Seed,
    pub chunk_x: i64,
    pub chunk_y: i64,
}

/// One revealed chunk. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkEntry {
    pub objects: Vec<MapObject>,
    pub meta: ChunkMeta,
}

/// Outcome of trying to claim a chunk for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The caller now owns the chunk and must commit or release it.
    Claimed,
    /// The chunk is already cached.
    AlreadyRevealed,
    /// Another reveal is generating this chunk.
    InFlight,
}

type InFlight = Arc<Mutex<HashMap<Seed, HashSet<ChunkCoord>>>>;

fn release_in_flight(in_flight: &Mutex<HashMap<Seed, HashSet<ChunkCoord>>>, seed: Seed, chunk: ChunkCoord) {
    let mut sets = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = sets.get_mut(&seed) {
        set.remove(&chunk);
        if set.is_empty() {
            sets.remove(&seed);
        }
    }
}

/// A claimed chunk owned by a running reveal. Unless settled, dropping it
/// releases the claim so the chunk can be retried.
struct PendingChunk {
    in_flight: InFlight,
    seed: Seed,
    chunk: ChunkCoord,
    settled: bool,
}

impl PendingChunk {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingChunk {
    fn drop(&mut self) {
        if !self.settled {
            release_in_flight(&self.in_flight, self.seed, self.chunk);
            debug!(seed = self.seed, chunk_x = self.chunk.x, chunk_y = self.chunk.y, "chunk claim released");
        }
    }
}

/// Revealed chunks for every seed, plus the chunks currently being generated.
#[derive(Debug, Default)]
pub struct RevealedChunkCache {
    entries: BTreeMap<ChunkKey, ChunkEntry>,
    in_flight: InFlight,
}

impl RevealedChunkCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh cache behind a shared lock.
    #[must_use]
    pub fn shared() -> SharedChunkCache {
        Arc::new(RwLock::new(Self::new()))
    }

    #[must_use]
    pub fn is_chunk_revealed(&self, seed: Seed, chunk: ChunkCoord) -> bool {
        self.entries.contains_key(&ChunkKey { seed, chunk })
    }

    #[must_use]
    pub fn is_in_flight(&self, seed: Seed, chunk: ChunkCoord) -> bool {
        let sets = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        sets.get(&seed).is_some_and(|set| set.contains(&chunk))
    }

    /// Reserve `chunk` for generation unless it is cached or already reserved.
    pub fn claim(&self, seed: Seed, chunk: ChunkCoord) -> Claim {
        if self.is_chunk_revealed(seed, chunk) {
            return Claim::AlreadyRevealed;
        }
        let mut sets = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if sets.entry(seed).or_default().insert(chunk) {
            Claim::Claimed
        } else {
            Claim::InFlight
        }
    }

    /// Drop a claim without storing anything, so a later reveal retries the chunk.
    pub fn release(&self, seed: Seed, chunk: ChunkCoord) {
        release_in_flight(&self.in_flight, seed, chunk);
    }

    /// Claim `chunk` and tie the claim to a guard that releases it on drop.
    fn claim_pending(&self, seed: Seed, chunk: ChunkCoord) -> Result<PendingChunk, Claim> {
        match self.claim(seed, chunk) {
            Claim::Claimed => {
                Ok(PendingChunk { in_flight: InFlight::clone(&self.in_flight), seed, chunk, settled: false })
            }
            other => Err(other),
        }
    }

    /// Store a generated chunk and drop its claim.
    ///
    /// Returns `false` (and keeps the existing entry) if the chunk was already cached.
    pub fn commit(&mut self, seed: Seed, chunk: ChunkCoord, objects: Vec<MapObject>) -> bool {
        self.release(seed, chunk);
        let key = ChunkKey { seed, chunk };
        if self.entries.contains_key(&key) {
            return false;
        }
        let meta = ChunkMeta { timestamp_ms: now_ms(), seed, chunk_x: chunk.x, chunk_y: chunk.y };
        self.entries.insert(key, ChunkEntry { objects, meta });
        true
    }

    #[must_use]
    pub fn entry(&self, seed: Seed, chunk: ChunkCoord) -> Option<&ChunkEntry> {
        self.entries.get(&ChunkKey { seed, chunk })
    }

    /// Every revealed chunk for `seed`, in chunk order.
    pub fn entries(&self, seed: Seed) -> impl Iterator<Item = &ChunkEntry> {
        self.entries.range(ChunkKey::seed_range(seed)).map(|(_, entry)| entry)
    }

    /// Revealed chunk coordinates for `seed`.
    pub fn chunks(&self, seed: Seed) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.entries.range(ChunkKey::seed_range(seed)).map(|(key, _)| key.chunk)
    }

    #[must_use]
    pub fn revealed_chunk_count(&self, seed: Seed) -> usize {
        self.entries(seed).count()
    }

    /// All objects across every revealed chunk of `seed`.
    #[must_use]
    pub fn revealed_objects(&self, seed: Seed) -> Vec<&MapObject> {
        self.entries(seed).flat_map(|entry| entry.objects.iter()).collect()
    }

    /// Like [`Self::revealed_objects`], without kinds hidden in `visibility`.
    #[must_use]
    pub fn visible_objects(&self, seed: Seed, visibility: &KindVisibility) -> Vec<&MapObject> {
        self.entries(seed)
            .flat_map(|entry| entry.objects.iter())
            .filter(|obj| visibility.is_visible(obj.kind()))
            .collect()
    }

    /// Forget revealed chunks for one seed, or for every seed when `seed` is `None`.
    /// Returns the number of chunks removed. Chunks still being generated are not affected.
    pub fn clear_revealed_chunks(&mut self, seed: Option<Seed>) -> usize {
        let before = self.entries.len();
        match seed {
            Some(seed) => self.entries.retain(|_, entry| entry.meta.seed != seed),
            None => self.entries.clear(),
        }
        let removed = before - self.entries.len();
        info!(seed = ?seed, removed, "revealed chunks cleared");
        removed
    }

    /// Total chunks cached across all seeds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A neighborhood to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRequest {
    pub seed: Seed,
    /// World point whose chunk is the middle of the neighborhood.
    pub center: Point,
    pub chunk_radius: u32,
}

/// Summary of one reveal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealReport {
    /// Chunks generated and committed by this reveal.
    pub new_chunks: usize,
    /// Chunks in the neighborhood, `(2r+1)^2`.
    pub total_chunks: usize,
    /// Chunks whose generation failed; they remain unrevealed.
    pub failed_chunks: usize,
    /// Chunks skipped because another reveal was generating them.
    pub skipped_in_flight: usize,
}

/// Reveal every chunk of the requested neighborhood that is not cached yet.
///
/// Chunks are requested one at a time with `chunk_radius == 0`. A failing
/// chunk is logged, left unrevealed and does not stop the loop.
pub async fn reveal_chunks<G>(
    cache: &RwLock<RevealedChunkCache>,
    generator: &G,
    request: RevealRequest,
    config: &MapConfig,
) -> RevealReport
where
    G: RegionGenerator + ?Sized,
{
    let RevealRequest { seed, center, chunk_radius } = request;
    let total_chunks = neighborhood_size(chunk_radius);
    if total_chunks > config.reveal_warn_chunks {
        warn!(seed, chunk_radius, total_chunks, limit = config.reveal_warn_chunks, "large reveal requested");
    }

    let mut report = RevealReport { total_chunks, ..RevealReport::default() };
    let middle = ChunkCoord::containing(center, config.chunk_size);

    for chunk in middle.neighborhood(chunk_radius) {
        let claimed = cache.read().await.claim_pending(seed, chunk);
        let pending = match claimed {
            Ok(pending) => pending,
            Err(Claim::InFlight) => {
                report.skipped_in_flight += 1;
                continue;
            }
            Err(_) => continue,
        };

        let result = generator.region_objects(seed, chunk.center(config.chunk_size), 0).await;
        match result {
            Ok(objects) => {
                if cache.write().await.commit(seed, chunk, objects) {
                    report.new_chunks += 1;
                }
                pending.settle();
            }
            Err(e) => {
                drop(pending);
                report.failed_chunks += 1;
                warn!(seed, chunk_x = chunk.x, chunk_y = chunk.y, error = %e, "chunk generation failed");
            }
        }
    }

    debug!(
        seed,
        new = report.new_chunks,
        total = report.total_chunks,
        failed = report.failed_chunks,
        skipped = report.skipped_in_flight,
        "reveal finished"
    );
    report
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
