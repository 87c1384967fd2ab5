//! Cache statistics.
//!
//! [`CacheStats`] is a bundle of atomic counters shared between the cache
//! and its consumers. Counters are incremented under the cache mutex but
//! may be read at any time without it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic operation counters for a cache instance.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Total commands processed (ADD/UPDATE/GET/DELETE).
    pub total_requests: AtomicU64,
    /// GET operations that found the key.
    pub hits: AtomicU64,
    /// GET operations that missed.
    pub misses: AtomicU64,
    /// Entries removed by the eviction engine.
    pub evictions: AtomicU64,
    /// Successful ADD operations.
    pub adds: AtomicU64,
    /// Successful UPDATE operations.
    pub updates: AtomicU64,
    /// Successful DELETE operations.
    pub deletes: AtomicU64,
    /// Times the defragmenter ran.
    pub defragmentations: AtomicU64,
    /// Free-list merge attempts (one per insert into the free list).
    pub coalesces: AtomicU64,
}

impl CacheStats {
    /// Create a zeroed counter bundle.
    pub const fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            adds: AtomicU64::new(0),
            updates: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            defragmentations: AtomicU64::new(0),
            coalesces: AtomicU64::new(0),
        }
    }

    /// Fraction of requests that were GET hits, in `[0, 1]`.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total > 0 {
            self.hits.load(Ordering::Relaxed) as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset every counter to zero.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.adds.store(0, Ordering::Relaxed);
        self.updates.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.defragmentations.store(0, Ordering::Relaxed);
        self.coalesces.store(0, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            adds: self.adds.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            defragmentations: self.defragmentations.load(Ordering::Relaxed),
            coalesces: self.coalesces.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of [`CacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Total commands processed.
    pub total_requests: u64,
    /// GET hits.
    pub hits: u64,
    /// GET misses.
    pub misses: u64,
    /// Evicted entries.
    pub evictions: u64,
    /// Successful ADDs.
    pub adds: u64,
    /// Successful UPDATEs.
    pub updates: u64,
    /// Successful DELETEs.
    pub deletes: u64,
    /// Defragmenter runs.
    pub defragmentations: u64,
    /// Free-list merge attempts.
    pub coalesces: u64,
}

impl CacheStatsSnapshot {
    /// Fraction of requests that were GET hits, in `[0, 1]`.
    pub fn hit_ratio(&self) -> f64 {
        if self.total_requests > 0 {
            self.hits as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}

/// Point-in-time view of free-space fragmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FragmentationStats {
    /// Total free pages across all extents.
    pub total_free_pages: usize,
    /// Length of the largest free extent.
    pub largest_free_block: usize,
    /// Number of free extents.
    pub num_free_blocks: usize,
    /// `1 - largest / total`, in `[0, 1]`. Zero when nothing is free.
    pub fragmentation_ratio: f64,
}
