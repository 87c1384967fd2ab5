//! Cache entry metadata.

use std::collections::HashMap;
use std::sync::Arc;

use crate::keylist::KeyHandle;

/// Mapping from key to entry metadata.
pub(crate) type EntryTable = HashMap<Arc<[u8]>, CacheEntry, ahash::RandomState>;

/// Metadata for one stored value.
///
/// The value bytes live in the page arena at
/// `[start_page, start_page + num_pages)`; only `start_page` ever changes
/// after admission, and only during compaction.
#[derive(Debug)]
pub(crate) struct CacheEntry {
    /// The entry's key.
    pub key: Arc<[u8]>,
    /// Id of the client that wrote the value.
    pub owner: Box<[u8]>,
    /// First page of the entry's contiguous run.
    pub start_page: usize,
    /// Number of pages in the run, always at least one.
    pub num_pages: usize,
    /// Exact value length in bytes.
    pub data_size: usize,
    /// Handle into the active policy's key list.
    pub handle: KeyHandle,
    /// Monotonic admission counter, assigned at allocation time.
    pub insertion_order: u64,
    /// Second-chance bit (SIEVE).
    pub visited: bool,
    /// Second-chance bit (CLOCK).
    pub reference_bit: bool,
}
