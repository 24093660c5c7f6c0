//! Aggregate statistics over the revealed region of one seed.

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ObjectKind;
use crate::reveal::{RevealedChunkCache, Seed};

/// Derived counts for the revealed region. Recomputed, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStatistics {
    /// Objects per kind, ambient kinds included.
    pub object_counts: BTreeMap<ObjectKind, usize>,
    /// Objects of meaningful kinds only.
    pub total_objects: usize,
    /// Meaningful objects per revealed chunk.
    pub density: f64,
    /// Revealed world area in square world units.
    pub region_area: f64,
    pub revealed_chunks: usize,
}

impl ViewStatistics {
    /// Statistics for `seed`, or `None` when nothing has been revealed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(cache: &RevealedChunkCache, seed: Seed, chunk_area: f64) -> Option<Self> {
        let revealed_chunks = cache.revealed_chunk_count(seed);
        if revealed_chunks == 0 {
            return None;
        }

        let mut object_counts: BTreeMap<ObjectKind, usize> = BTreeMap::new();
        for obj in cache.revealed_objects(seed) {
            *object_counts.entry(obj.kind()).or_default() += 1;
        }
        let total_objects = object_counts.iter().filter(|(kind, _)| kind.is_meaningful()).map(|(_, n)| n).sum();

        Some(Self {
            object_counts,
            total_objects,
            density: total_objects as f64 / revealed_chunks as f64,
            region_area: revealed_chunks as f64 * chunk_area,
            revealed_chunks,
        })
    }

    /// Count for one kind; zero when none were revealed.
    #[must_use]
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.object_counts.get(&kind).copied().unwrap_or(0)
    }
}
