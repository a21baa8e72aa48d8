//! Correctness Tests for the ARC Cache
//!
//! These tests drive the cache only through its public API and check the
//! observable laws of the policy: hit reporting, promotion into `T2`, ghost
//! resurrection, the direction in which `p` adapts, the list size bounds and
//! the exact sequence of calls a ghost archive receives.
//!
//! ## Test Strategy
//! - Small capacities (1-8) for hand-traceable scenarios
//! - `snapshot()` to assert list membership and MRU order
//! - Seeded `StdRng` sequences for the randomized properties

use arc_cache::logger::Field;
use arc_cache::{
    ArcCache, ArcCacheConfig, ArchiveError, CacheMetrics, GhostArchive, GhostList, Level,
    ListKind, Logger,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

// ============================================================================
// HELPERS
// ============================================================================

fn make_cache<K: std::hash::Hash + Eq + Clone, V>(cap: usize) -> ArcCache<K, V> {
    ArcCache::new(NonZeroUsize::new(cap).unwrap())
}

/// Checks the size bounds that must hold after every operation.
fn assert_bounds<K: std::hash::Hash + Eq + Clone, V>(cache: &ArcCache<K, V>) {
    let c = cache.cap().get();
    let (t1, t2, b1, b2) = cache.list_lengths();
    assert!(t1 + t2 <= c, "|T1| + |T2| = {} > {c}", t1 + t2);
    assert!(t1 + b1 <= c, "|T1| + |B1| = {} > {c}", t1 + b1);
    assert!(t1 + t2 + b1 + b2 <= 2 * c, "directory {} > 2c", t1 + t2 + b1 + b2);
    assert!(cache.target_t1() <= c, "p = {} > {c}", cache.target_t1());
    assert_eq!(cache.len(), t1 + t2);
}

/// Live ghost sets as the archive sees them, plus protocol violations.
#[derive(Default)]
struct ArchiveLedger {
    live: [HashSet<u32>; 2],
    pushes: usize,
    drops: usize,
    duplicate_pushes: usize,
    unknown_drops: usize,
}

fn slot(list: GhostList) -> usize {
    match list {
        GhostList::B1 => 0,
        GhostList::B2 => 1,
    }
}

#[derive(Clone, Default)]
struct CountingArchive(Arc<Mutex<ArchiveLedger>>);

impl GhostArchive<u32, u64> for CountingArchive {
    fn push_front(&mut self, list: GhostList, key: &u32, _value: u64) -> Result<(), ArchiveError> {
        let mut ledger = self.0.lock().unwrap();
        ledger.pushes += 1;
        if !ledger.live[slot(list)].insert(*key) {
            ledger.duplicate_pushes += 1;
        }
        Ok(())
    }

    fn drop_entry(&mut self, list: GhostList, key: &u32) -> Result<(), ArchiveError> {
        let mut ledger = self.0.lock().unwrap();
        ledger.drops += 1;
        if !ledger.live[slot(list)].remove(key) {
            ledger.unknown_drops += 1;
        }
        Ok(())
    }

    fn forget(&mut self, list: GhostList) -> Result<(), ArchiveError> {
        self.0.lock().unwrap().live[slot(list)].clear();
        Ok(())
    }
}

/// An archive whose backend is always down.
struct OfflineArchive;

impl GhostArchive<&'static str, i32> for OfflineArchive {
    fn push_front(&mut self, _: GhostList, _: &&'static str, _: i32) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unavailable("connection refused".to_string()))
    }

    fn drop_entry(&mut self, _: GhostList, _: &&'static str) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unavailable("connection refused".to_string()))
    }

    fn forget(&mut self, _: GhostList) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unavailable("connection refused".to_string()))
    }
}

#[derive(Default)]
struct WarnCollector(Mutex<Vec<String>>);

impl Logger for WarnCollector {
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        if level == Level::Warn {
            let rendered: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.0
                .lock()
                .unwrap()
                .push(format!("{message} {}", rendered.join(" ")));
        }
    }
}

// ============================================================================
// HIT REPORTING
// ============================================================================

#[test]
fn test_put_then_get_hits() {
    let mut cache = make_cache(3);
    cache.put("a", 1);
    assert_eq!(cache.get(&"a"), Some(&1));
    assert_eq!(cache.get(&"never"), None);
}

#[test]
fn test_key_forgotten_past_history_misses() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.put("C", 3);

    // T1 was full and B1 had no room, so A left without a ghost.
    assert_eq!(cache.get(&"A"), None);
    assert_eq!(cache.snapshot().locate(&"A"), None);
    assert_eq!(cache.target_t1(), 0);
}

#[test]
fn test_ghost_is_never_a_hit() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"B");
    cache.put("C", 3);

    assert_eq!(cache.snapshot().locate(&"A"), Some(ListKind::B1));
    // Only the earlier `get(B)` has counted as a hit.
    assert_eq!(cache.metrics().get("cache_hits"), Some(&1.0));

    assert_eq!(cache.get(&"A"), None);
    assert!(!cache.contains_key(&"A"));
    assert_eq!(cache.peek(&"A"), None);

    let metrics = cache.metrics();
    assert_eq!(metrics.get("cache_hits"), Some(&1.0));
    assert_eq!(metrics.get("b1_ghost_hits"), Some(&1.0));
}

// ============================================================================
// PROMOTION
// ============================================================================

#[test]
fn test_second_reference_promotes_to_t2() {
    let mut cache = make_cache(3);
    cache.put("hot", 0);
    assert_eq!(cache.snapshot().locate(&"hot"), Some(ListKind::T1));
    cache.get(&"hot");
    assert_eq!(cache.snapshot().locate(&"hot"), Some(ListKind::T2));
    cache.get(&"hot");
    assert_eq!(cache.snapshot().t2, ["hot"]);
}

#[test]
fn test_frequent_key_survives_one_time_scan() {
    let mut cache = make_cache(3);
    cache.put(0u32, 0u32);
    cache.get(&0);
    cache.get(&0);

    for key in 1..=50 {
        cache.put(key, key);
        assert!(cache.contains_key(&key), "a put never evicts its own key");
        assert_bounds(&cache);
    }

    assert!(cache.contains_key(&0));
    assert_eq!(cache.snapshot().locate(&0), Some(ListKind::T2));
}

// ============================================================================
// CAPACITY BOUNDARY SCENARIOS
// ============================================================================

#[test]
fn test_resurrection_from_b1_demotes_one_resident() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"B");
    cache.put("C", 3);
    assert_eq!(cache.snapshot().b1, ["A"]);

    assert!(cache.put("A", 10));

    let snap = cache.snapshot();
    assert_eq!(snap.t2, ["A"]);
    assert_eq!(snap.t1, ["C"]);
    assert_eq!(snap.b2, ["B"], "exactly one resident was demoted");
    assert!(snap.b1.is_empty());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&"A"), Some(&10));
}

#[test]
fn test_three_inserts_without_reuse_forget_oldest() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.put("C", 3);

    // A re-request is a fresh admission: C stays, B is dropped.
    assert!(!cache.put("A", 4));
    let snap = cache.snapshot();
    assert_eq!(snap.t1, ["A", "C"]);
    assert!(snap.b1.is_empty());
    assert_eq!(cache.len(), 2);
}

// ============================================================================
// UPDATES
// ============================================================================

#[test]
fn test_update_is_idempotent_on_len() {
    let mut cache = make_cache(4);
    cache.put("k", "v1");
    cache.put("other", "x");
    let len = cache.len();

    assert!(cache.put("k", "v2"));
    assert_eq!(cache.len(), len);
    assert_eq!(cache.get(&"k"), Some(&"v2"));
}

// ============================================================================
// ADAPTATION DIRECTION
// ============================================================================

#[test]
fn test_adaptation_direction() {
    let c = 4;
    let mut cache: ArcCache<String, u32> = make_cache(c);
    for i in 0..c {
        let key = format!("freq-{i}");
        cache.put(key.clone(), 0);
        cache.get(&key);
    }

    // B1 phase: one-time keys flow through T1; resurrecting their ghosts
    // must push p up until it reaches c.
    let mut p = cache.target_t1();
    let mut b1_hits = 0;
    for round in 0..60 {
        cache.put(format!("once-{round}"), round);
        if let Some(ghost) = cache.snapshot().b1.first().cloned() {
            cache.put(ghost, round);
            b1_hits += 1;
            let next = cache.target_t1();
            assert!(next > p || p == c, "B1 hit moved p from {p} to {next}");
            p = next;
        }
        assert!(cache.target_t1() >= p);
        assert_bounds(&cache);
    }
    assert!(b1_hits > 0);
    assert!(p > 0);

    // B2 phase: keys referenced twice are demoted from T2; resurrecting those
    // ghosts must pull p back down until it reaches 0.
    let start = p;
    let mut b2_hits = 0;
    for round in 0..60 {
        let key = format!("twice-{round}");
        cache.put(key.clone(), round);
        cache.get(&key);
        if let Some(ghost) = cache.snapshot().b2.first().cloned() {
            cache.put(ghost, round);
            b2_hits += 1;
            let next = cache.target_t1();
            assert!(next < p || p == 0, "B2 hit moved p from {p} to {next}");
            p = next;
        }
        assert!(cache.target_t1() <= p);
        assert_bounds(&cache);
    }
    assert!(b2_hits > 0);
    assert!(p < start);
}

#[test]
fn test_ghost_lookup_adapts_once() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"B");
    cache.put("C", 3);

    cache.get(&"A");
    cache.get(&"A");
    cache.get(&"A");
    assert_eq!(cache.target_t1(), 1);
    assert_eq!(cache.metrics().get("adaptations"), Some(&1.0));
}

// ============================================================================
// INVARIANTS
// ============================================================================

#[test]
fn test_random_sequences_preserve_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    for cap in [1usize, 2, 5, 8] {
        let mut cache: ArcCache<u32, u32> = make_cache(cap);
        let key_space = cap as u32 * 3;
        for step in 0..4_000 {
            let key = rng.gen_range(0..key_space);
            if rng.gen_bool(0.5) {
                cache.put(key, step);
            } else {
                cache.get(&key);
            }
            assert_bounds(&cache);
        }
    }
}

#[test]
fn test_remove_and_clear() {
    let mut cache = make_cache(2);
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"B");
    cache.put("C", 3);

    assert_eq!(cache.remove(&"C"), Some(3));
    assert_eq!(cache.remove(&"A"), None);
    assert_eq!(cache.snapshot().locate(&"A"), None);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.list_lengths(), (0, 0, 0, 0));
    assert_eq!(cache.target_t1(), 0);
}

// ============================================================================
// GHOST ARCHIVE
// ============================================================================

#[test]
fn test_archive_consistency_over_random_operations() {
    let archive = CountingArchive::default();
    let config = ArcCacheConfig::new(NonZeroUsize::new(16).unwrap()).with_archive(archive.clone());
    let mut cache: ArcCache<u32, u64> = ArcCache::init(config, None);
    let mut rng = StdRng::seed_from_u64(0xA2C);

    for step in 0..10_000u64 {
        let key = rng.gen_range(0..64u32);
        match rng.gen_range(0..20) {
            0..=8 => {
                cache.put(key, step);
            }
            9..=18 => {
                cache.get(&key);
            }
            _ => {
                cache.remove(&key);
            }
        }
    }

    let ledger = archive.0.lock().unwrap();
    assert_eq!(ledger.duplicate_pushes, 0);
    assert_eq!(ledger.unknown_drops, 0);

    let snap = cache.snapshot();
    let b1: HashSet<u32> = snap.b1.iter().copied().collect();
    let b2: HashSet<u32> = snap.b2.iter().copied().collect();
    assert_eq!(ledger.live[0], b1);
    assert_eq!(ledger.live[1], b2);
    assert_eq!(ledger.pushes, ledger.drops + b1.len() + b2.len());
    assert!(ledger.pushes > 0);
}

#[test]
fn test_archive_forgets_both_lists_on_clear() {
    let archive = CountingArchive::default();
    let config = ArcCacheConfig::new(NonZeroUsize::new(2).unwrap()).with_archive(archive.clone());
    let mut cache: ArcCache<u32, u64> = ArcCache::init(config, None);

    cache.put(1, 1);
    cache.get(&1);
    cache.put(2, 2);
    cache.put(3, 3);
    cache.get(&3);
    cache.put(4, 4);
    assert!(!archive.0.lock().unwrap().live[0].is_empty());
    assert!(!archive.0.lock().unwrap().live[1].is_empty());

    cache.clear();
    let ledger = archive.0.lock().unwrap();
    assert!(ledger.live[0].is_empty());
    assert!(ledger.live[1].is_empty());
}

#[test]
fn test_archive_failures_are_logged_and_ignored() {
    let logger = Arc::new(WarnCollector::default());
    let config = ArcCacheConfig::new(NonZeroUsize::new(2).unwrap())
        .with_logger(logger.clone())
        .with_archive(OfflineArchive);
    let mut cache = ArcCache::init(config, None);

    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"B");
    cache.put("C", 3);
    assert!(cache.put("A", 4));

    assert_eq!(cache.get(&"A"), Some(&4));
    assert_eq!(cache.snapshot().b2, ["B"]);

    let warnings = logger.0.lock().unwrap();
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].starts_with("ghost archive operation failed"));
    assert!(warnings[0].contains("operation=push_front"));
    assert!(warnings[0].contains("list=B1"));
    assert!(warnings[0].contains("connection refused"));
}
