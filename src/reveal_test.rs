use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::*;
use crate::generator::GenerationError;
use crate::object::{ObjectBody, ObjectKind};

// =============================================================
// Helpers
// =============================================================

/// Emits one star at each requested chunk center, counting calls.
#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
    failing: Mutex<HashSet<ChunkCoord>>,
    yield_between: bool,
}

impl CountingGenerator {
    fn yielding() -> Self {
        Self { yield_between: true, ..Self::default() }
    }

    fn fail_on(&self, chunk: ChunkCoord) {
        self.failing.lock().unwrap().insert(chunk);
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegionGenerator for CountingGenerator {
    async fn region_objects(
        &self,
        _seed: Seed,
        center: Point,
        chunk_radius: u32,
    ) -> Result<Vec<MapObject>, GenerationError> {
        assert_eq!(chunk_radius, 0, "cache must request one chunk at a time");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_between {
            tokio::task::yield_now().await;
        }
        let chunk = ChunkCoord::containing(center, 1000.0);
        if self.failing.lock().unwrap().contains(&chunk) {
            return Err(GenerationError::Failed { x: center.x, y: center.y, reason: "boom".into() });
        }
        Ok(vec![MapObject::new(
            Uuid::new_v4(),
            center.x,
            center.y,
            ObjectBody::CelestialStar { spectral_class: "G".into(), radius: 10.0 },
        )])
    }
}

/// Never answers, like a backend that hangs.
struct StalledGenerator;

#[async_trait]
impl RegionGenerator for StalledGenerator {
    async fn region_objects(
        &self,
        _seed: Seed,
        _center: Point,
        _chunk_radius: u32,
    ) -> Result<Vec<MapObject>, GenerationError> {
        std::future::pending().await
    }
}

fn request(seed: Seed, x: f64, y: f64, chunk_radius: u32) -> RevealRequest {
    RevealRequest { seed, center: Point::new(x, y), chunk_radius }
}

fn star() -> MapObject {
    MapObject::new(Uuid::new_v4(), 0.0, 0.0, ObjectBody::CelestialStar { spectral_class: "M".into(), radius: 5.0 })
}

fn background() -> MapObject {
    MapObject::new(Uuid::new_v4(), 0.0, 0.0, ObjectBody::BackgroundStar { brightness: 0.5 })
}

// =============================================================
// ChunkCoord
// =============================================================

#[test]
fn containing_floors_negative_coordinates() {
    assert_eq!(ChunkCoord::containing(Point::new(0.0, 0.0), 1000.0), ChunkCoord::new(0, 0));
    assert_eq!(ChunkCoord::containing(Point::new(999.9, 1000.0), 1000.0), ChunkCoord::new(0, 1));
    assert_eq!(ChunkCoord::containing(Point::new(-0.5, -1000.0), 1000.0), ChunkCoord::new(-1, -1));
    assert_eq!(ChunkCoord::containing(Point::new(-1000.5, 2500.0), 1000.0), ChunkCoord::new(-2, 2));
}

#[test]
fn origin_and_center() {
    let chunk = ChunkCoord::new(-1, 2);
    assert_eq!(chunk.origin(1000.0), Point::new(-1000.0, 2000.0));
    assert_eq!(chunk.center(1000.0), Point::new(-500.0, 2500.0));
    assert_eq!(ChunkCoord::containing(chunk.center(1000.0), 1000.0), chunk);
}

#[test]
fn neighborhood_counts() {
    let middle = ChunkCoord::new(3, -4);
    assert_eq!(middle.neighborhood(0).collect::<Vec<_>>(), vec![middle]);
    let ring: HashSet<ChunkCoord> = middle.neighborhood(1).collect();
    assert_eq!(ring.len(), 9);
    assert!(ring.contains(&ChunkCoord::new(2, -5)));
    assert!(ring.contains(&ChunkCoord::new(4, -3)));
    assert_eq!(middle.neighborhood(2).count(), neighborhood_size(2));
    assert_eq!(neighborhood_size(2), 25);
}

#[test]
fn neighborhood_size_saturates_for_huge_radius() {
    assert_eq!(neighborhood_size(1_000_000), 4_000_004_000_001);
    assert_eq!(neighborhood_size(u32::MAX), usize::MAX);
}

#[tokio::test]
async fn huge_radius_reveal_does_not_overflow() {
    let cache = RevealedChunkCache::shared();
    let config = MapConfig::default();
    let reveal = reveal_chunks(&cache, &StalledGenerator, request(1, 0.0, 0.0, u32::MAX), &config);
    let report = tokio::time::timeout(Duration::from_millis(10), reveal).await;
    assert!(report.is_err());
    assert_eq!(cache.read().await.revealed_chunk_count(1), 0);
}

// =============================================================
// Cache bookkeeping
// =============================================================

#[test]
fn claim_commit_release() {
    let mut cache = RevealedChunkCache::new();
    let chunk = ChunkCoord::new(0, 0);

    assert_eq!(cache.claim(1, chunk), Claim::Claimed);
    assert!(cache.is_in_flight(1, chunk));
    assert_eq!(cache.claim(1, chunk), Claim::InFlight);
    // Same chunk under another seed is independent.
    assert_eq!(cache.claim(2, chunk), Claim::Claimed);

    cache.release(2, chunk);
    assert!(!cache.is_in_flight(2, chunk));

    assert!(cache.commit(1, chunk, vec![star()]));
    assert!(!cache.is_in_flight(1, chunk));
    assert!(cache.is_chunk_revealed(1, chunk));
    assert!(!cache.is_chunk_revealed(2, chunk));
    assert_eq!(cache.claim(1, chunk), Claim::AlreadyRevealed);
}

#[test]
fn commit_never_overwrites() {
    let mut cache = RevealedChunkCache::new();
    let chunk = ChunkCoord::new(5, 5);
    let first = star();
    assert!(cache.commit(9, chunk, vec![first.clone()]));
    assert!(!cache.commit(9, chunk, vec![star(), star()]));
    let entry = cache.entry(9, chunk).unwrap();
    assert_eq!(entry.objects, vec![first]);
    assert_eq!(entry.meta.seed, 9);
    assert_eq!((entry.meta.chunk_x, entry.meta.chunk_y), (5, 5));
    assert!(entry.meta.timestamp_ms > 0);
}

#[test]
fn queries_are_scoped_to_seed() {
    let mut cache = RevealedChunkCache::new();
    cache.commit(1, ChunkCoord::new(0, 0), vec![star(), background()]);
    cache.commit(1, ChunkCoord::new(-1, 0), vec![star()]);
    cache.commit(2, ChunkCoord::new(0, 0), vec![star()]);

    assert_eq!(cache.revealed_chunk_count(1), 2);
    assert_eq!(cache.revealed_chunk_count(2), 1);
    assert_eq!(cache.revealed_chunk_count(3), 0);
    assert_eq!(cache.revealed_objects(1).len(), 3);
    assert_eq!(cache.chunks(1).collect::<Vec<_>>(), vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0)]);
    assert_eq!(cache.len(), 3);
}

#[test]
fn visibility_filters_without_mutating() {
    let mut cache = RevealedChunkCache::new();
    cache.commit(1, ChunkCoord::new(0, 0), vec![star(), background(), background()]);

    let mut vis = KindVisibility::new();
    vis.set_visible(ObjectKind::BackgroundStar, false);
    let visible = cache.visible_objects(1, &vis);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind(), ObjectKind::CelestialStar);
    assert_eq!(cache.revealed_objects(1).len(), 3);
}

#[test]
fn clear_one_seed_or_all() {
    let mut cache = RevealedChunkCache::new();
    cache.commit(1, ChunkCoord::new(0, 0), vec![star()]);
    cache.commit(1, ChunkCoord::new(0, 1), vec![star()]);
    cache.commit(2, ChunkCoord::new(0, 0), vec![star()]);

    assert_eq!(cache.clear_revealed_chunks(Some(1)), 2);
    assert_eq!(cache.revealed_chunk_count(1), 0);
    assert_eq!(cache.revealed_chunk_count(2), 1);

    assert_eq!(cache.clear_revealed_chunks(None), 1);
    assert!(cache.is_empty());
}

// =============================================================
// reveal_chunks
// =============================================================

#[tokio::test]
async fn reveal_is_idempotent() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    let config = MapConfig::default();

    let first = reveal_chunks(&cache, &generator, request(42, 0.0, 0.0, 1), &config).await;
    assert_eq!(first.new_chunks, 9);
    assert_eq!(first.total_chunks, 9);
    let size = cache.read().await.len();
    assert_eq!(size, 9);

    let second = reveal_chunks(&cache, &generator, request(42, 0.0, 0.0, 1), &config).await;
    assert_eq!(second.new_chunks, 0);
    assert_eq!(second.total_chunks, 9);
    assert_eq!(cache.read().await.len(), size);
    assert_eq!(generator.calls(), 9);
}

#[tokio::test]
async fn overlapping_reveals_fetch_only_new_chunks() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    let config = MapConfig::default();

    reveal_chunks(&cache, &generator, request(7, 0.0, 0.0, 1), &config).await;
    // One chunk to the right: the 3 chunks of column x=2 are new.
    let report = reveal_chunks(&cache, &generator, request(7, 1500.0, 0.0, 1), &config).await;
    assert_eq!(report.new_chunks, 3);
    assert_eq!(cache.read().await.revealed_chunk_count(7), 12);
}

#[tokio::test]
async fn reveal_centers_requests_on_chunks() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    reveal_chunks(&cache, &generator, request(1, -10.0, -10.0, 0), &MapConfig::default()).await;

    let guard = cache.read().await;
    let entry = guard.entry(1, ChunkCoord::new(-1, -1)).unwrap();
    assert_eq!(entry.objects[0].position(), Some(Point::new(-500.0, -500.0)));
}

#[tokio::test]
async fn failed_chunk_is_skipped_then_retried() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    let config = MapConfig::default();
    let bad = ChunkCoord::new(1, 1);
    generator.fail_on(bad);

    let report = reveal_chunks(&cache, &generator, request(3, 0.0, 0.0, 1), &config).await;
    assert_eq!(report.new_chunks, 8);
    assert_eq!(report.failed_chunks, 1);
    {
        let guard = cache.read().await;
        assert!(!guard.is_chunk_revealed(3, bad));
        assert!(!guard.is_in_flight(3, bad));
    }

    generator.heal();
    let retry = reveal_chunks(&cache, &generator, request(3, 0.0, 0.0, 1), &config).await;
    assert_eq!(retry.new_chunks, 1);
    assert_eq!(retry.failed_chunks, 0);
    assert!(cache.read().await.is_chunk_revealed(3, bad));
}

#[tokio::test]
async fn cancelled_reveal_leaves_chunk_retryable() {
    let cache = RevealedChunkCache::shared();
    let config = MapConfig::default();
    let chunk = ChunkCoord::new(0, 0);

    let reveal = reveal_chunks(&cache, &StalledGenerator, request(5, 0.0, 0.0, 0), &config);
    let stalled = tokio::time::timeout(Duration::from_millis(10), reveal).await;
    assert!(stalled.is_err());
    assert!(!cache.read().await.is_in_flight(5, chunk));

    let generator = CountingGenerator::default();
    let retry = reveal_chunks(&cache, &generator, request(5, 0.0, 0.0, 0), &config).await;
    assert_eq!(retry.new_chunks, 1);
    assert_eq!(retry.skipped_in_flight, 0);
    assert_eq!(generator.calls(), 1);
    assert!(cache.read().await.is_chunk_revealed(5, chunk));
}

#[tokio::test]
async fn oversized_reveal_still_completes() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    let config = MapConfig { reveal_warn_chunks: 4, ..MapConfig::default() };

    let report = reveal_chunks(&cache, &generator, request(1, 0.0, 0.0, 1), &config).await;
    assert_eq!(report.total_chunks, 9);
    assert_eq!(report.new_chunks, 9);
}

#[tokio::test]
async fn concurrent_reveals_never_fetch_a_chunk_twice() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::yielding();
    let config = MapConfig::default();

    let (a, b) = tokio::join!(
        reveal_chunks(&cache, &generator, request(11, 0.0, 0.0, 1), &config),
        reveal_chunks(&cache, &generator, request(11, 0.0, 0.0, 1), &config),
    );

    assert_eq!(generator.calls(), 9);
    assert_eq!(a.new_chunks + b.new_chunks, 9);
    assert!(a.skipped_in_flight + b.skipped_in_flight > 0);
    let guard = cache.read().await;
    assert_eq!(guard.revealed_chunk_count(11), 9);
    assert!(!guard.is_in_flight(11, ChunkCoord::new(0, 0)));
}

#[tokio::test]
async fn seeds_are_cached_independently() {
    let cache = RevealedChunkCache::shared();
    let generator = CountingGenerator::default();
    let config = MapConfig::default();

    reveal_chunks(&cache, &generator, request(1, 0.0, 0.0, 0), &config).await;
    let other = reveal_chunks(&cache, &generator, request(2, 0.0, 0.0, 0), &config).await;
    assert_eq!(other.new_chunks, 1);
    assert_eq!(cache.read().await.len(), 2);
}
