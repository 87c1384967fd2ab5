//! Eviction policy behavior through the public API.

use paged_cache::{CacheError, EvictionPolicy, PagedCache};

const PAGE: usize = 1024;

fn full_cache(policy: EvictionPolicy, pages: usize) -> PagedCache {
    let cache = PagedCache::builder()
        .cache_size(pages * PAGE)
        .page_size(PAGE)
        .eviction_policy(policy)
        .build()
        .unwrap();
    for i in 1..=pages {
        cache
            .add(format!("k{}", i).as_bytes(), &vec![i as u8; PAGE], b"c")
            .unwrap();
    }
    cache
}

#[test]
fn lru_evicts_least_recently_used() {
    let cache = full_cache(EvictionPolicy::Lru, 5);

    cache.get(b"k1", b"c").unwrap();
    cache.get(b"k2", b"c").unwrap();

    cache.add(b"new", &vec![0xFF; PAGE], b"c").unwrap();

    // The victim is the least-recently-used among the untouched rest.
    assert_eq!(cache.stats().snapshot().evictions, 1);
    assert!(cache.contains(b"k1"));
    assert!(cache.contains(b"k2"));
    assert!(!cache.contains(b"k3"));
}

#[test]
fn fifo_evicts_in_admission_order() {
    let cache = full_cache(EvictionPolicy::Fifo, 4);

    // Touches change nothing under FIFO.
    cache.get(b"k1", b"c").unwrap();
    cache.get(b"k1", b"c").unwrap();

    cache.add(b"n1", &vec![1; PAGE], b"c").unwrap();
    assert!(!cache.contains(b"k1"));

    cache.add(b"n2", &vec![2; PAGE], b"c").unwrap();
    assert!(!cache.contains(b"k2"));
    assert!(cache.contains(b"n1"));
}

#[test]
fn sieve_grants_second_chance_to_touched_keys() {
    let cache = full_cache(EvictionPolicy::Sieve, 5);

    cache.get(b"k3", b"c").unwrap();

    // Hand starts at the newest entry; the first untouched entry it
    // meets is k5.
    cache.add(b"k6", &vec![6; PAGE], b"c").unwrap();
    assert!(!cache.contains(b"k5"));
    assert!(cache.contains(b"k3"));

    // The hand persists: the next eviction continues where it stopped.
    cache.add(b"k7", &vec![7; PAGE], b"c").unwrap();
    assert!(!cache.contains(b"k4"));
    assert!(cache.contains(b"k3"));
}

#[test]
fn clock_clears_reference_bits_as_it_sweeps() {
    let cache = full_cache(EvictionPolicy::Clock, 5);

    cache.get(b"k1", b"c").unwrap();
    cache.get(b"k2", b"c").unwrap();

    // Hand starts at k1: both touched entries get their bits cleared
    // and k3 is the first clear entry.
    cache.add(b"k6", &vec![6; PAGE], b"c").unwrap();
    assert!(cache.contains(b"k1"));
    assert!(cache.contains(b"k2"));
    assert!(!cache.contains(b"k3"));

    // Bits were consumed: k1 is no longer protected once the hand
    // returns.
    cache.add(b"k7", &vec![7; PAGE], b"c").unwrap();
    assert!(!cache.contains(b"k4"));
}

#[test]
fn eviction_failure_surfaces_out_of_capacity() {
    let cache = PagedCache::builder()
        .cache_size(4 * PAGE)
        .page_size(PAGE)
        .eviction_policy(EvictionPolicy::Lru)
        .build()
        .unwrap();

    // Larger than the arena: rejected before any eviction happens.
    assert_eq!(
        cache.add(b"huge", &vec![0; 5 * PAGE], b"c"),
        Err(CacheError::PayloadTooLarge)
    );
    assert_eq!(cache.stats().snapshot().evictions, 0);

    // Exactly arena-sized: evicts everything live, then fits.
    cache.add(b"a", &vec![1; PAGE], b"c").unwrap();
    cache.add(b"b", &vec![2; 4 * PAGE], b"c").unwrap();
    assert!(!cache.contains(b"a"));
    assert_eq!(cache.get(b"b", b"c").unwrap(), vec![2; 4 * PAGE]);
}

#[test]
fn eviction_counts_every_victim() {
    let cache = full_cache(EvictionPolicy::Fifo, 6);

    // A 3-page value forces three single-page victims.
    cache.add(b"wide", &vec![9; 3 * PAGE], b"c").unwrap();
    assert_eq!(cache.stats().snapshot().evictions, 3);
    assert!(!cache.contains(b"k1"));
    assert!(!cache.contains(b"k2"));
    assert!(!cache.contains(b"k3"));
    assert!(cache.contains(b"k4"));
}
