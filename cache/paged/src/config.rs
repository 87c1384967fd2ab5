//! Cache configuration and sizing.

use std::fmt;

use crate::policy::EvictionPolicy;

/// Default page size: 40 KiB.
pub const DEFAULT_PAGE_SIZE: usize = 40 * 1024;

/// Default arena size: 100 MiB.
pub const DEFAULT_CACHE_SIZE: usize = 100 * 1024 * 1024;

/// Strategy used when scanning the free list for a fitting extent.
///
/// Best-fit minimizes fragmentation blow-up for mixed-size values and is
/// the default; first-fit trades placement quality for a shorter scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementStrategy {
    /// Smallest extent that satisfies the request, ties broken by address.
    #[default]
    BestFit,
    /// First extent (lowest address) that satisfies the request.
    FirstFit,
}

/// Configuration for a [`PagedCache`](crate::PagedCache).
#[derive(Debug, Clone)]
pub struct PagedCacheConfig {
    /// Total arena size in bytes. The arena holds `cache_size / page_size`
    /// pages; a remainder smaller than one page is ignored.
    pub cache_size: usize,
    /// Size of a single page in bytes.
    pub page_size: usize,
    /// Eviction policy, fixed for the lifetime of the cache.
    pub policy: EvictionPolicy,
    /// Free-list placement strategy.
    pub placement: PlacementStrategy,
}

impl Default for PagedCacheConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            policy: EvictionPolicy::default(),
            placement: PlacementStrategy::default(),
        }
    }
}

/// Error returned when a cache configuration is rejected at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The page size was zero.
    ZeroPageSize,
    /// The arena cannot hold even a single page.
    CacheTooSmall {
        /// Configured arena size in bytes.
        cache_size: usize,
        /// Configured page size in bytes.
        page_size: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPageSize => write!(f, "page_size must be non-zero"),
            Self::CacheTooSmall {
                cache_size,
                page_size,
            } => write!(
                f,
                "cache_size ({}) must hold at least one page ({})",
                cache_size, page_size
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PagedCacheConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.cache_size < self.page_size {
            return Err(ConfigError::CacheTooSmall {
                cache_size: self.cache_size,
                page_size: self.page_size,
            });
        }
        Ok(())
    }
}

/// Number of pages needed to store `data_size` bytes.
///
/// Every live entry occupies at least one page, so a zero-length value
/// still rounds up to one.
#[inline]
pub(crate) fn pages_required(data_size: usize, page_size: usize) -> usize {
    data_size.max(1).div_ceil(page_size)
}
