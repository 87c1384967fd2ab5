//! Eviction policies and their auxiliary index structures.
//!
//! Each policy tracks residency order in a [`KeyList`]:
//!
//! - **LRU**: most-recent at the head; a hit moves the entry's handle to
//!   the head, the victim is the tail.
//! - **FIFO**: admission order, oldest at the head; hits are a no-op, the
//!   victim is the head.
//! - **SIEVE**: newest at the head; a persistent hand sweeps from the
//!   newest end toward the oldest, clearing `visited` bits, and wraps
//!   back to the newest end when it falls off.
//! - **CLOCK**: the list is treated as a ring; new entries are placed
//!   immediately before the hand so they are visited last. The hand
//!   clears `reference_bit`s as it advances and evicts the first clear
//!   entry it finds.

use std::fmt;
use std::sync::Arc;

use crate::entry::EntryTable;
use crate::keylist::{KeyHandle, KeyList};

/// Eviction policy selection, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Least recently used.
    #[default]
    Lru,
    /// First in, first out (admission order).
    Fifo,
    /// SIEVE second-chance sweep over an ordered list.
    Sieve,
    /// CLOCK second-chance sweep over a ring.
    Clock,
}

impl EvictionPolicy {
    /// Short lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
            Self::Sieve => "sieve",
            Self::Clock => "clock",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary ordering structure for the active policy.
///
/// Contains exactly the set of live keys at all times; the entry table
/// holds the per-entry policy fields (`visited`, `reference_bit`,
/// `insertion_order`).
pub(crate) struct PolicyIndex {
    policy: EvictionPolicy,
    list: KeyList,
    /// Sweep cursor for SIEVE and CLOCK. `None` for SIEVE means the hand
    /// restarts at the newest end.
    hand: Option<KeyHandle>,
}

impl PolicyIndex {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            list: KeyList::new(),
            hand: None,
        }
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    #[inline]
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Register a newly admitted key, returning its list handle.
    pub fn on_insert(&mut self, key: Arc<[u8]>) -> KeyHandle {
        match self.policy {
            // Most-recent end is the head.
            EvictionPolicy::Lru => self.list.push_front(key),
            // Oldest admission at the head.
            EvictionPolicy::Fifo => self.list.push_back(key),
            // Newest at the head, visited bit starts cleared.
            EvictionPolicy::Sieve => self.list.push_front(key),
            // Placed just before the hand in ring order: visited last in
            // the sweep. The ring predecessor of the head is the tail.
            EvictionPolicy::Clock => match self.hand {
                Some(hand) if self.list.front() == Some(hand) => self.list.push_back(key),
                Some(hand) => self.list.insert_before(hand, key),
                None => {
                    let handle = self.list.push_front(key);
                    self.hand = Some(handle);
                    handle
                }
            },
        }
    }

    /// Record a hit on `handle`. Second-chance bits live on the entry and
    /// are set by the caller; this updates list order where the policy
    /// requires it.
    pub fn on_touch(&mut self, handle: KeyHandle) {
        if self.policy == EvictionPolicy::Lru {
            self.list.move_to_front(handle);
        }
    }

    /// Drop a key from the index. If the hand points at the removed node
    /// it advances first, so it never dangles.
    pub fn on_remove(&mut self, handle: KeyHandle) {
        if self.hand == Some(handle) {
            let next = self.advance(handle);
            self.hand = if next == Some(handle) { None } else { next };
        }
        self.list.remove(handle);
    }

    /// Select the next victim under the policy, clearing second-chance
    /// bits as the hand sweeps. The victim is *not* removed; the caller
    /// frees its pages and then calls [`on_remove`](Self::on_remove).
    pub fn next_victim(&mut self, entries: &mut EntryTable) -> Option<Arc<[u8]>> {
        match self.policy {
            EvictionPolicy::Lru => self.list.back().map(|h| self.list.key(h).clone()),
            EvictionPolicy::Fifo => self.list.front().map(|h| self.list.key(h).clone()),
            EvictionPolicy::Sieve | EvictionPolicy::Clock => self.sweep(entries),
        }
    }

    /// Advance the hand one step in sweep order, wrapping to the newest
    /// end (the head).
    fn advance(&self, handle: KeyHandle) -> Option<KeyHandle> {
        self.list.next(handle).or_else(|| self.list.front())
    }

    fn sweep(&mut self, entries: &mut EntryTable) -> Option<Arc<[u8]>> {
        if self.list.is_empty() {
            return None;
        }
        let mut hand = self.hand.or_else(|| self.list.front())?;

        // One full revolution clears every bit, so a victim must be found
        // within two revolutions.
        for _ in 0..2 * self.list.len() + 1 {
            let key = self.list.key(hand).clone();
            let entry = entries
                .get_mut(key.as_ref())
                .expect("policy index key missing from entry table");

            let bit = match self.policy {
                EvictionPolicy::Sieve => &mut entry.visited,
                EvictionPolicy::Clock => &mut entry.reference_bit,
                _ => unreachable!(),
            };

            if *bit {
                *bit = false;
                hand = self.advance(hand)?;
                continue;
            }

            // Park the hand past the victim before the caller unlinks it.
            let next = self.advance(hand);
            self.hand = if next == Some(hand) { None } else { next };
            return Some(key);
        }

        unreachable!("second-chance sweep failed to converge");
    }

    /// All keys currently tracked, in list order.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<Arc<[u8]>> {
        self.list.iter().cloned().collect()
    }
}
