//! Page-arena key/value cache with online defragmentation.
//!
//! This crate provides an in-memory cache that stores values in a
//! fixed-size byte arena carved into fixed-size pages. Values occupy a
//! contiguous run of pages; free space is tracked by a sorted, coalescing
//! free list, and allocation failures trigger online compaction before
//! eviction is considered.
//!
//! # Architecture
//!
//! ```text
//! +---------------------------------------------+
//! |                 PagedCache                  |
//! |  (single coarse mutex, atomic CacheStats)   |
//! |                                             |
//! |  +---------------------------------------+  |
//! |  | EntryTable                            |  |
//! |  | - key -> (pages, size, policy fields) |  |
//! |  +---------------------------------------+  |
//! |        |                                    |
//! |        v                                    |
//! |  +-------------------+  +----------------+  |
//! |  | FreeList          |  | PolicyIndex    |  |
//! |  | - sorted extents  |  | - LRU / FIFO / |  |
//! |  | - best-fit, split |  |   SIEVE / CLOCK|  |
//! |  | - coalesce        |  +----------------+  |
//! |  +-------------------+                      |
//! |        |                                    |
//! |        v                                    |
//! |  +---------------------------------------+  |
//! |  | PageArena (pages of 40 KiB)           |  |
//! |  +---------------------------------------+  |
//! +---------------------------------------------+
//! ```
//!
//! # Allocation path
//!
//! A write of `s` bytes needs `ceil(s / page_size)` contiguous pages:
//!
//! 1. Scan the free list (best-fit by default). On success, split the
//!    extent and commit.
//! 2. If no extent fits but enough pages are free in total, compact the
//!    arena: every live entry slides to the low end, leaving one maximal
//!    free extent at the high end.
//! 3. If the pages simply are not there, evict under the configured
//!    policy until they are.
//!
//! # Locking
//!
//! All mutation happens under one coarse mutex. This is deliberate:
//! compaction relocates every live entry and therefore needs exclusive
//! access to the whole arena. Statistics are atomics and may be read
//! without the lock.
//!
//! # Example
//!
//! ```
//! use paged_cache::{EvictionPolicy, PagedCache};
//!
//! let cache = PagedCache::builder()
//!     .cache_size(64 * 1024)
//!     .page_size(4 * 1024)
//!     .eviction_policy(EvictionPolicy::Sieve)
//!     .build()
//!     .unwrap();
//!
//! cache.add(b"key", b"value", b"client-1").unwrap();
//! assert_eq!(cache.get(b"key", b"client-1").unwrap(), b"value");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
mod cache;
mod config;
mod entry;
mod error;
mod freelist;
mod keylist;
mod policy;
mod stats;

use std::sync::Arc;

use parking_lot::Mutex;

use cache::CacheCore;

pub use config::{
    ConfigError, DEFAULT_CACHE_SIZE, DEFAULT_PAGE_SIZE, PagedCacheConfig, PlacementStrategy,
};
pub use error::{CacheError, CacheResult};
pub use policy::EvictionPolicy;
pub use stats::{CacheStats, CacheStatsSnapshot, FragmentationStats};

/// Thread-safe page-arena cache.
///
/// All operations serialize behind a single mutex; see the crate docs for
/// why the lock is coarse. The cache is created once and its page size,
/// arena size, and eviction policy are immutable afterwards.
pub struct PagedCache {
    core: Mutex<CacheCore>,
    stats: Arc<CacheStats>,
    policy: EvictionPolicy,
    page_size: usize,
    total_pages: usize,
}

impl PagedCache {
    /// Create a builder with default settings (100 MiB arena, 40 KiB
    /// pages, LRU).
    pub fn builder() -> PagedCacheBuilder {
        PagedCacheBuilder::default()
    }

    /// Create a cache from an explicit configuration.
    pub fn new(config: PagedCacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let stats = Arc::new(CacheStats::new());
        let core = CacheCore::new(&config, stats.clone());
        Ok(Self {
            core: Mutex::new(core),
            stats,
            policy: config.policy,
            page_size: config.page_size,
            total_pages: config.cache_size / config.page_size,
        })
    }

    /// Store a new value. Fails with [`CacheError::KeyExists`] if the key
    /// is already present.
    pub fn add(&self, key: &[u8], value: &[u8], owner: &[u8]) -> CacheResult<()> {
        self.core.lock().add(key, value, owner)
    }

    /// Replace the value of an existing key. Fails with
    /// [`CacheError::NotFound`] if the key is absent.
    pub fn update(&self, key: &[u8], value: &[u8], owner: &[u8]) -> CacheResult<()> {
        self.core.lock().update(key, value, owner)
    }

    /// Fetch a value, touching it in the active eviction policy.
    pub fn get(&self, key: &[u8], _owner: &[u8]) -> CacheResult<Vec<u8>> {
        self.core.lock().get(key)
    }

    /// Remove a value, releasing its pages back to the free list.
    pub fn delete(&self, key: &[u8], _owner: &[u8]) -> CacheResult<()> {
        self.core.lock().delete(key)
    }

    /// Whether a key is currently live. Does not touch the policy.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.core.lock().contains(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The operation counters. Readable at any time without the cache
    /// lock.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Point-in-time free-space fragmentation figures.
    pub fn fragmentation_stats(&self) -> FragmentationStats {
        self.core.lock().fragmentation_stats()
    }

    /// Reset every operation counter to zero.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// The eviction policy fixed at construction.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Page size in bytes.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages in the arena.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }
}

/// Builder for [`PagedCache`].
#[derive(Debug, Clone, Default)]
pub struct PagedCacheBuilder {
    config: PagedCacheConfig,
}

impl PagedCacheBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total arena size in bytes.
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = bytes;
        self
    }

    /// Set the page size in bytes.
    pub fn page_size(mut self, bytes: usize) -> Self {
        self.config.page_size = bytes;
        self
    }

    /// Set the eviction policy.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the free-list placement strategy.
    pub fn placement(mut self, placement: PlacementStrategy) -> Self {
        self.config.placement = placement;
        self
    }

    /// Build the cache.
    pub fn build(self) -> Result<PagedCache, ConfigError> {
        PagedCache::new(self.config)
    }
}
