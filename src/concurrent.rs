//! Thread-Safe ARC Cache
//!
//! [`ConcurrentArcCache`] serializes every operation through one
//! `parking_lot::Mutex` around the ARC state. There is no sharding: ARC's
//! adaptation relies on global list lengths, so splitting the key space
//! would give each shard its own `p` and change the policy.
//!
//! A `Mutex` rather than an `RwLock` is used because every lookup mutates
//! list order.
//!
//! # Ghost Archive Handoff
//!
//! Archive calls never run under the cache lock, and no cache operation
//! waits for the archive:
//!
//! ```text
//!   lock(cache) ── mutate ── move events to outbox ── unlock(cache)
//!   try_lock(archive) ── drain outbox ── unlock(archive) ── recheck outbox
//! ```
//!
//! Events enter the outbox while the cache lock is held, so the outbox is
//! in state order. Only the thread holding the archive lock drains it. A
//! thread that fails `try_lock` leaves its events for the current holder,
//! which rechecks the outbox after unlocking.
//!
//! # Example
//!
//! ```rust
//! use arc_cache::concurrent::ConcurrentArcCache;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentArcCache::new(NonZeroUsize::new(1000).unwrap()));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 let key = format!("key_{t}_{i}");
//!                 cache.put(key.clone(), i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 400);
//! ```

extern crate alloc;

use crate::arc::{ArcSegment, ArcSnapshot};
use crate::archive::{self, GhostArchive, GhostEvent};
use crate::config::ConcurrentArcCacheConfig;
use crate::error::CacheError;
use crate::logger::Logger;
use crate::metrics::CacheMetrics;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe Adaptive Replacement Cache.
///
/// Same semantics as [`ArcCache`](crate::ArcCache); lookups return clones
/// so no reference outlives the lock. Use [`get_with`](Self::get_with) to
/// read in place.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone + Send`.
/// - `V`: Value type. Must implement `Clone + Send` for the cloning getters.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
pub struct ConcurrentArcCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<ArcSegment<K, V, S>>,
    sink: Option<ArchiveSink<K, V>>,
    logger: Arc<dyn Logger>,
}

/// The archive and the events still waiting to reach it.
struct ArchiveSink<K, V> {
    archive: Mutex<Box<dyn GhostArchive<K, V>>>,
    outbox: Mutex<Vec<GhostEvent<K, V>>>,
}

impl<K, V> ConcurrentArcCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
{
    /// Creates a cache holding up to `capacity` values, with no logger and
    /// no archive.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::init(ConcurrentArcCacheConfig::new(capacity), None)
    }

    /// Like [`new`](Self::new), but rejects a zero capacity with an error.
    pub fn try_new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self::new(capacity))
    }

    /// Builds a cache from a configuration with an optional hasher.
    pub fn init(
        config: ConcurrentArcCacheConfig<K, V>,
        hasher: Option<DefaultHashBuilder>,
    ) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V, S> ConcurrentArcCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
    S: BuildHasher + Send,
{
    /// Builds a cache from a configuration and a custom hash builder.
    pub fn init_with_hasher(config: ConcurrentArcCacheConfig<K, V>, hash_builder: S) -> Self {
        let ConcurrentArcCacheConfig {
            capacity,
            logger,
            archive,
        } = config;
        logger.info(
            "concurrent arc cache created",
            &[("capacity", &capacity), ("archive", &archive.is_some())],
        );
        let segment = ArcSegment::with_hasher(
            capacity,
            hash_builder,
            Arc::clone(&logger),
            archive.is_some(),
        );
        Self {
            segment: Mutex::new(segment),
            sink: archive.map(|archive| ArchiveSink {
                archive: Mutex::new(archive),
                outbox: Mutex::new(Vec::new()),
            }),
            logger,
        }
    }

    /// Runs `f` under the cache lock, queues any ghost events it produced,
    /// and delivers the queue after releasing the lock.
    fn with_segment<R>(&self, f: impl FnOnce(&mut ArcSegment<K, V, S>) -> R) -> R {
        let mut segment = self.segment.lock();
        let result = f(&mut *segment);

        let Some(sink) = &self.sink else {
            return result;
        };
        let mut events = segment.take_pending();
        if !events.is_empty() {
            sink.outbox.lock().append(&mut events);
        }
        drop(segment);

        self.deliver(sink);
        result
    }

    /// Drains the outbox into the archive unless another thread already is.
    fn deliver(&self, sink: &ArchiveSink<K, V>) {
        loop {
            let Some(mut target) = sink.archive.try_lock() else {
                return;
            };
            loop {
                let events = mem::take(&mut *sink.outbox.lock());
                if events.is_empty() {
                    break;
                }
                archive::dispatch(&mut **target, events, &*self.logger);
            }
            drop(target);

            // Events queued between the last drain and the unlock.
            if sink.outbox.lock().is_empty() {
                return;
            }
        }
    }

    /// Maximum number of resident values.
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.lock().cap()
    }

    /// Number of resident values.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if no value is resident.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Current adaptive target size for `T1` (`p`).
    pub fn target_t1(&self) -> usize {
        self.segment.lock().target_t1()
    }

    /// Lengths of `(T1, T2, B1, B2)`, read under one lock.
    pub fn list_lengths(&self) -> (usize, usize, usize, usize) {
        self.segment.lock().list_lengths()
    }

    /// Looks up `key` and returns a clone of its value.
    ///
    /// Counts as an access exactly like [`ArcCache::get`](crate::ArcCache::get).
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Looks up `key` and applies `f` to the value while the lock is held.
    ///
    /// ```rust
    /// use arc_cache::concurrent::ConcurrentArcCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let cache = ConcurrentArcCache::new(NonZeroUsize::new(4).unwrap());
    /// cache.put("greeting", String::from("hello world"));
    /// assert_eq!(cache.get_with(&"greeting", |v| v.len()), Some(11));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Looks up `key` and applies `f` to a mutable reference in place.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.segment.lock().get_mut(key).map(f)
    }

    /// Clone of a resident value, without counting an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().peek(key).cloned()
    }

    /// Returns `true` if `key` is resident.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Inserts or updates `key`. Returns `true` if the key was already
    /// known, resident or as a ghost.
    pub fn put(&self, key: K, value: V) -> bool {
        self.with_segment(|segment| segment.put(key, value))
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.with_segment(|segment| segment.remove(key))
    }

    /// Drops all values and ghost history, and resets `p`.
    pub fn clear(&self) {
        self.with_segment(|segment| segment.clear());
    }

    /// Captures the current directory under the lock.
    pub fn snapshot(&self) -> ArcSnapshot<K> {
        self.segment.lock().snapshot()
    }

    /// Checks every structural and size invariant, panicking on violation.
    #[cfg(any(test, debug_assertions))]
    #[doc(hidden)]
    pub fn debug_validate_invariants(&self) {
        self.segment.lock().debug_validate_invariants();
    }
}

impl<K, V, S> CacheMetrics for ConcurrentArcCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
    S: BuildHasher + Send,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentARC"
    }
}

impl<K, V, S> fmt::Debug for ConcurrentArcCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentArcCache")
            .field("segment", &*self.segment.lock())
            .field("archive", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::meta::GhostList;
    use scoped_threadpool::Pool;

    extern crate std;
    use std::string::ToString;
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::thread;
    use std::time::{Duration, Instant};
    use std::vec::Vec;

    fn make_cache<K, V>(capacity: usize) -> ConcurrentArcCache<K, V>
    where
        K: Hash + Eq + Clone + Send,
        V: Send,
    {
        ConcurrentArcCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    /// Collects delivered events in a shared vector.
    #[derive(Clone, Default)]
    struct EventLog(Arc<StdMutex<Vec<GhostEvent<u64, u64>>>>);

    impl GhostArchive<u64, u64> for EventLog {
        fn push_front(&mut self, list: GhostList, key: &u64, value: u64) -> Result<(), ArchiveError> {
            self.0.lock().unwrap().push(GhostEvent::Demoted {
                list,
                key: *key,
                value,
            });
            Ok(())
        }

        fn drop_entry(&mut self, list: GhostList, key: &u64) -> Result<(), ArchiveError> {
            self.0
                .lock()
                .unwrap()
                .push(GhostEvent::Dropped { list, key: *key });
            Ok(())
        }

        fn forget(&mut self, list: GhostList) -> Result<(), ArchiveError> {
            self.0.lock().unwrap().push(GhostEvent::Cleared { list });
            Ok(())
        }
    }

    #[test]
    fn test_basic_operations() {
        let cache: ConcurrentArcCache<String, i32> = make_cache(2);
        assert!(cache.is_empty());

        assert!(!cache.put("a".to_string(), 1));
        assert!(!cache.put("b".to_string(), 2));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("missing"), None);
        assert!(cache.put("a".to_string(), 3));
        assert_eq!(cache.peek("a"), Some(3));
        assert!(cache.contains_key("b"));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.remove("b"), Some(2));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.algorithm_name(), "ConcurrentARC");
    }

    #[test]
    fn test_ghost_semantics_match_single_threaded() {
        let cache: ConcurrentArcCache<&str, i32> = make_cache(2);
        cache.put("A", 1);
        cache.put("B", 2);
        cache.get(&"B");
        cache.put("C", 3);

        assert_eq!(cache.get(&"A"), None);
        assert_eq!(cache.target_t1(), 1);
        assert!(cache.put("A", 4));

        let snap = cache.snapshot();
        assert_eq!(snap.t1, ["C"]);
        assert_eq!(snap.t2, ["A"]);
        assert_eq!(snap.b2, ["B"]);
        assert_eq!(cache.list_lengths(), (1, 1, 0, 1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_get_with_and_get_mut_with() {
        let cache: ConcurrentArcCache<&str, Vec<u8>> = make_cache(4);
        cache.put("bytes", std::vec![1, 2, 3]);

        assert_eq!(cache.get_with(&"bytes", |v| v.len()), Some(3));
        assert_eq!(cache.get_with(&"nope", |v| v.len()), None);

        cache.get_mut_with(&"bytes", |v| v.push(4));
        assert_eq!(cache.get(&"bytes"), Some(std::vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_archive_events_delivered_in_state_order() {
        let log = EventLog::default();
        let config = ConcurrentArcCacheConfig::new(NonZeroUsize::new(2).unwrap())
            .with_archive(log.clone());
        let cache: ConcurrentArcCache<u64, u64> = ConcurrentArcCache::init(config, None);

        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&2);
        cache.put(3, 30);
        cache.put(1, 11);

        let events = log.0.lock().unwrap();
        assert_eq!(
            *events,
            [
                GhostEvent::Demoted {
                    list: GhostList::B1,
                    key: 1,
                    value: 10
                },
                GhostEvent::Demoted {
                    list: GhostList::B2,
                    key: 2,
                    value: 20
                },
                GhostEvent::Dropped {
                    list: GhostList::B1,
                    key: 1
                },
            ]
        );
    }

    /// Records events like [`EventLog`], but stalls on its first push.
    struct SlowArchive {
        log: EventLog,
        entered: Arc<AtomicBool>,
        stall: Duration,
    }

    impl GhostArchive<u64, u64> for SlowArchive {
        fn push_front(&mut self, list: GhostList, key: &u64, value: u64) -> Result<(), ArchiveError> {
            if !self.entered.swap(true, Ordering::SeqCst) {
                thread::sleep(self.stall);
            }
            self.log.push_front(list, key, value)
        }

        fn drop_entry(&mut self, list: GhostList, key: &u64) -> Result<(), ArchiveError> {
            self.log.drop_entry(list, key)
        }

        fn forget(&mut self, list: GhostList) -> Result<(), ArchiveError> {
            self.log.forget(list)
        }
    }

    #[test]
    fn test_slow_archive_does_not_block_other_operations() {
        let log = EventLog::default();
        let entered = Arc::new(AtomicBool::new(false));
        let config = ConcurrentArcCacheConfig::new(NonZeroUsize::new(2).unwrap()).with_archive(
            SlowArchive {
                log: log.clone(),
                entered: Arc::clone(&entered),
                stall: Duration::from_millis(500),
            },
        );
        let cache: Arc<ConcurrentArcCache<u64, u64>> =
            Arc::new(ConcurrentArcCache::init(config, None));

        // T1 = [2], T2 = [1]
        cache.put(1, 1);
        cache.get(&1);
        cache.put(2, 2);

        // Demotes 2 into B1; this thread then stalls inside the archive.
        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.put(3, 3))
        };
        while !entered.load(Ordering::SeqCst) {
            thread::yield_now();
        }

        // Drops ghost 2 and demotes 3 while the archive is still busy.
        let start = Instant::now();
        assert!(!cache.put(4, 4));
        assert!(start.elapsed() < Duration::from_millis(250));

        let start = Instant::now();
        assert_eq!(cache.get(&1), Some(1));
        assert!(start.elapsed() < Duration::from_millis(250));

        assert!(!writer.join().unwrap());
        assert_eq!(
            *log.0.lock().unwrap(),
            [
                GhostEvent::Demoted {
                    list: GhostList::B1,
                    key: 2,
                    value: 2
                },
                GhostEvent::Dropped {
                    list: GhostList::B1,
                    key: 2
                },
                GhostEvent::Demoted {
                    list: GhostList::B1,
                    key: 3,
                    value: 3
                },
            ]
        );
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_concurrent_access_with_threads() {
        let cache: Arc<ConcurrentArcCache<u64, u64>> = Arc::new(make_cache(64));
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500u64 {
                        let key = (t * 31 + i) % 200;
                        if i % 3 == 0 {
                            cache.get(&key);
                        } else {
                            cache.put(key, i);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_scoped_pool_shares_borrowed_cache() {
        let log = EventLog::default();
        let config = ConcurrentArcCacheConfig::new(NonZeroUsize::new(16).unwrap())
            .with_archive(log.clone());
        let cache: ConcurrentArcCache<u64, u64> = ConcurrentArcCache::init(config, None);
        let mut pool = Pool::new(4);

        pool.scoped(|scope| {
            for worker in 0..4u64 {
                let cache = &cache;
                scope.execute(move || {
                    for i in 0..1_000u64 {
                        let key = (worker * 7 + i * 13) % 64;
                        if i % 4 == 0 {
                            cache.remove(&key);
                        } else if i % 2 == 0 {
                            cache.get(&key);
                        } else {
                            cache.put(key, i);
                        }
                    }
                });
            }
        });

        cache.debug_validate_invariants();

        // Every ghost that is still in the directory was pushed exactly once
        // more than it was dropped.
        let snap = cache.snapshot();
        let events = log.0.lock().unwrap();
        for (list, ghosts) in [(GhostList::B1, &snap.b1), (GhostList::B2, &snap.b2)] {
            for key in ghosts.iter() {
                let pushes = events
                    .iter()
                    .filter(|e| matches!(e, GhostEvent::Demoted { list: l, key: k, .. } if *l == list && k == key))
                    .count();
                let drops = events
                    .iter()
                    .filter(|e| matches!(e, GhostEvent::Dropped { list: l, key: k } if *l == list && k == key))
                    .count();
                assert_eq!(pushes, drops + 1, "key {key} in {list}");
            }
        }
    }
}
