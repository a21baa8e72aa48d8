//! Adaptive Replacement Cache (ARC)
//!
//! ARC balances recency and frequency without a tuning knob. It keeps two
//! resident lists and two ghost lists and continuously moves a target size
//! `p` for the recency side based on which ghost list keeps getting hit.
//!
//! # Algorithm
//!
//! ```text
//!              recency side                    frequency side
//!   ◀── LRU ──────────────── MRU ┃ MRU ──────────────── LRU ──▶
//!   ┌────────────┬───────────────┃───────────────┬────────────┐
//!   │     B1     │      T1       ┃      T2       │     B2     │
//!   │  (ghosts)  │ (seen once)   ┃ (seen twice+) │  (ghosts)  │
//!   └────────────┴───────────────┃───────────────┴────────────┘
//!                  ◀──── p ────▶ ┃
//!                 |T1| + |T2| ≤ c, |T1| + |B1| ≤ c, all four ≤ 2c
//! ```
//!
//! Every request falls into one of four cases:
//!
//! - **Hit in `T1` or `T2`**: the key moves to the front of `T2`.
//! - **Hit in `B1`**: recency was undervalued, so `p` grows by
//!   `max(1, |B2| / |B1|)` (capped at `c`).
//! - **Hit in `B2`**: frequency was undervalued, so `p` shrinks by
//!   `max(1, |B1| / |B2|)` (floored at 0).
//! - **Miss**: room is made by dropping ghost history and/or demoting a
//!   resident, and the new key enters at the front of `T1`.
//!
//! Demotion ("replace") takes the LRU entry of `T1` when `T1` is above its
//! target, or exactly on it while serving a `B2` hit; otherwise it takes the
//! LRU entry of `T2`. The demoted key keeps its place in history as a ghost.
//!
//! Ghosts never count as hits. A `get` that lands on a ghost still shifts
//! `p`, but only once per ghost, and the key stays a ghost until a `put`
//! brings it back into `T2` with a new value.
//!
//! # Performance Characteristics
//!
//! - Get / Put / Remove: O(1)
//! - Memory: one arena slot and one index entry per resident or ghost key;
//!   ghosts keep their key but no value
//!
//! # Thread Safety
//!
//! `ArcCache` is single-threaded. Enable the `concurrent` feature for
//! `ConcurrentArcCache`, which guards the same state with one lock.

extern crate alloc;

use crate::archive::{self, GhostArchive, GhostEvent};
use crate::config::ArcCacheConfig;
use crate::entry::ArcEntry;
use crate::error::CacheError;
use crate::list::{List, SlotArena, SlotId};
use crate::logger::Logger;
use crate::meta::{GhostList, ListKind};
use crate::metrics::{ArcCacheMetrics, CacheMetrics};
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

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

const T1: usize = ListKind::T1.index();
const T2: usize = ListKind::T2.index();

/// The ARC state machine, shared by `ArcCache` and `ConcurrentArcCache`.
///
/// Ghost-list transitions are queued as [`GhostEvent`]s when `track_ghosts`
/// is set; the owner drains them and forwards them to its archive.
pub(crate) struct ArcSegment<K, V, S = DefaultHashBuilder> {
    capacity: NonZeroUsize,
    p: usize,
    arena: SlotArena<ArcEntry<K, V>>,
    lists: [List; 4],
    map: HashMap<K, SlotId, S>,
    metrics: ArcCacheMetrics,
    logger: Arc<dyn Logger>,
    track_ghosts: bool,
    pending: Vec<GhostEvent<K, V>>,
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> ArcSegment<K, V, S> {
    pub(crate) fn with_hasher(
        capacity: NonZeroUsize,
        hash_builder: S,
        logger: Arc<dyn Logger>,
        track_ghosts: bool,
    ) -> Self {
        let cap = capacity.get();
        let max_bytes = cap as u64 * Self::estimate_object_size();
        ArcSegment {
            capacity,
            p: 0,
            arena: SlotArena::with_capacity(cap.saturating_mul(2)),
            lists: [List::new(); 4],
            map: HashMap::with_capacity_and_hasher(cap.saturating_mul(2), hash_builder),
            metrics: ArcCacheMetrics::new(max_bytes, cap as u64),
            logger,
            track_ghosts,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of resident entries, `|T1| + |T2|`.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.lists[T1].len() + self.lists[T2].len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn target_t1(&self) -> usize {
        self.p
    }

    #[inline]
    pub(crate) fn list_len(&self, kind: ListKind) -> usize {
        self.lists[kind.index()].len()
    }

    pub(crate) fn list_lengths(&self) -> (usize, usize, usize, usize) {
        (
            self.list_len(ListKind::T1),
            self.list_len(ListKind::T2),
            self.list_len(ListKind::B1),
            self.list_len(ListKind::B2),
        )
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &ArcCacheMetrics {
        &self.metrics
    }

    fn estimate_object_size() -> u64 {
        mem::size_of::<K>() as u64 + mem::size_of::<V>() as u64 + 64
    }

    fn entry(&self, id: SlotId) -> &ArcEntry<K, V> {
        self.arena.get(id).expect("indexed slot must be occupied")
    }

    fn entry_mut(&mut self, id: SlotId) -> &mut ArcEntry<K, V> {
        self.arena.get_mut(id).expect("indexed slot must be occupied")
    }

    /// Unlinks `id` from `from` and links it at the front of `to`.
    fn relink(&mut self, id: SlotId, from: ListKind, to: ListKind) {
        self.lists[from.index()].unlink(&mut self.arena, id);
        self.lists[to.index()].push_front(&mut self.arena, id);
    }

    fn refresh_gauges(&mut self) {
        let lengths = self.list_lengths();
        self.metrics.update_list_sizes(lengths);
    }

    /// Runs the request bookkeeping for a lookup and returns the slot of the
    /// entry if it is resident.
    fn lookup<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let object_size = Self::estimate_object_size();
        let Some(id) = self.map.get(key).copied() else {
            self.metrics.core.record_miss(object_size);
            return None;
        };

        let list = self.entry(id).list();
        if let Some(ghost) = list.ghost() {
            // History hit: report a miss, but let it steer `p` once.
            self.metrics.record_ghost_hit(ghost);
            self.metrics.core.record_miss(object_size);
            if !self.entry(id).adapted() {
                self.adapt(ghost);
                self.entry_mut(id).mark_adapted();
            }
            return None;
        }

        self.metrics.record_resident_hit(list, object_size);
        self.relink(id, list, ListKind::T2);
        self.entry_mut(id).promote();
        self.refresh_gauges();
        Some(id)
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.lookup(key)?;
        self.entry(id).value()
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.lookup(key)?;
        self.entry_mut(id).value_mut()
    }

    /// Resident value for `key` without touching recency or `p`.
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.get(key)?;
        self.entry(*id).value()
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map
            .get(key)
            .is_some_and(|id| !self.entry(*id).is_ghost())
    }

    /// Inserts or updates `key`. Returns `true` if the key was already
    /// indexed, either resident or as a ghost.
    pub(crate) fn put(&mut self, key: K, value: V) -> bool {
        let object_size = Self::estimate_object_size();

        if let Some(id) = self.map.get(&key).copied() {
            let list = self.entry(id).list();
            match list {
                ListKind::T1 | ListKind::T2 => {
                    if list == ListKind::T1 {
                        self.metrics.promotions += 1;
                    }
                    self.entry_mut(id).replace_value(value);
                    self.relink(id, list, ListKind::T2);
                    self.entry_mut(id).promote();
                    self.metrics.core.record_update(object_size);
                }
                ListKind::B1 => self.resurrect(id, GhostList::B1, value),
                ListKind::B2 => self.resurrect(id, GhostList::B2, value),
            }
            self.refresh_gauges();
            return true;
        }

        self.admit(key, value);
        self.refresh_gauges();
        false
    }

    /// Case II / III: a ghost of `ghost` is requested again with a value.
    fn resurrect(&mut self, id: SlotId, ghost: GhostList, value: V) {
        if !self.entry(id).adapted() {
            self.metrics.record_ghost_hit(ghost);
            self.adapt(ghost);
        }
        self.replace(ghost == GhostList::B2);

        self.relink(id, ListKind::from(ghost), ListKind::T2);
        self.entry_mut(id).resurrect(value);
        if self.track_ghosts {
            let key = self.entry(id).key.clone();
            self.pending.push(GhostEvent::Dropped { list: ghost, key });
        }
        self.metrics
            .record_resurrection(Self::estimate_object_size());
    }

    /// Case IV: `key` is not indexed at all.
    fn admit(&mut self, key: K, value: V) {
        let c = self.capacity.get();
        let (t1, t2, b1, b2) = self.list_lengths();

        if t1 + b1 >= c {
            if t1 < c {
                self.evict_lru(ListKind::B1);
                self.replace(false);
            } else {
                self.evict_lru(ListKind::T1);
            }
        } else {
            let total = t1 + t2 + b1 + b2;
            if total >= c {
                if total >= 2 * c {
                    self.evict_lru(ListKind::B2);
                }
                self.replace(false);
            }
        }

        let id = self.arena.insert(ArcEntry::new(key.clone(), value));
        self.lists[T1].push_front(&mut self.arena, id);
        self.map.insert(key, id);
        self.metrics
            .core
            .record_insertion(Self::estimate_object_size());
    }

    /// Demotes one resident entry to its ghost list.
    ///
    /// Does nothing while the resident set has a free slot, which only
    /// happens after an explicit `remove`.
    fn replace(&mut self, hit_in_b2: bool) {
        let t1 = self.list_len(ListKind::T1);
        if t1 + self.list_len(ListKind::T2) < self.capacity.get() {
            return;
        }

        let from = if t1 > 0 && (t1 > self.p || (hit_in_b2 && t1 == self.p)) {
            ListKind::T1
        } else {
            ListKind::T2
        };
        let id = self.lists[from.index()]
            .pop_back(&mut self.arena)
            .expect("replace called with an empty resident list");

        let entry = self.entry_mut(id);
        let value = entry.demote();
        let to = entry.list();
        let ghost = to.ghost().expect("demoted entry is a ghost");
        self.lists[to.index()].push_front(&mut self.arena, id);

        self.metrics
            .record_demotion(ghost, Self::estimate_object_size());
        if self.track_ghosts {
            let key = self.entry(id).key.clone();
            self.pending.push(GhostEvent::Demoted {
                list: ghost,
                key,
                value,
            });
        }
    }

    /// Permanently drops the LRU entry of `kind`.
    fn evict_lru(&mut self, kind: ListKind) {
        let id = self.lists[kind.index()]
            .pop_back(&mut self.arena)
            .expect("evict-LRU called on an empty list");
        let entry = self.arena.remove(id).expect("linked slot must be occupied");
        self.map.remove(&entry.key);

        match kind.ghost() {
            Some(ghost) => {
                self.metrics.record_ghost_eviction();
                self.logger.debug("ghost evicted", &[("list", &ghost)]);
                if self.track_ghosts {
                    self.pending.push(GhostEvent::Dropped {
                        list: ghost,
                        key: entry.key,
                    });
                }
            }
            None => self
                .metrics
                .record_t1_eviction(Self::estimate_object_size()),
        }
    }

    /// Moves `p` toward the side whose ghost list was hit.
    fn adapt(&mut self, hit: GhostList) {
        let c = self.capacity.get();
        let b1 = self.list_len(ListKind::B1);
        let b2 = self.list_len(ListKind::B2);

        // The hit list holds the requested ghost, so its length is at least 1.
        let delta = match hit {
            GhostList::B1 => {
                let delta = if b1 >= b2 { 1 } else { b2 / b1.max(1) };
                self.p = (self.p + delta).min(c);
                delta
            }
            GhostList::B2 => {
                let delta = if b2 >= b1 { 1 } else { b1 / b2.max(1) };
                self.p = self.p.saturating_sub(delta);
                delta
            }
        };

        self.metrics.record_adaptation(self.p);
        self.logger.debug(
            "adapted target size",
            &[("hit", &hit), ("delta", &delta), ("p", &self.p)],
        );
    }

    /// Drops `key` from whichever list holds it. Only residents yield a value.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.remove(key)?;
        let list = self.entry(id).list();
        self.lists[list.index()].unlink(&mut self.arena, id);
        let entry = self.arena.remove(id).expect("indexed slot must be occupied");
        self.refresh_gauges();

        match list.ghost() {
            None => {
                self.metrics
                    .core
                    .record_removal(Self::estimate_object_size());
                entry.into_value()
            }
            Some(ghost) => {
                if self.track_ghosts {
                    self.pending.push(GhostEvent::Dropped {
                        list: ghost,
                        key: entry.key,
                    });
                }
                None
            }
        }
    }

    /// Empties all four lists and resets `p`.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        for list in &mut self.lists {
            list.clear();
        }
        self.map.clear();
        self.p = 0;
        self.metrics.core.record_clear();
        self.metrics.target_t1 = 0;
        self.refresh_gauges();
        if self.track_ghosts {
            for list in GhostList::ALL {
                self.pending.push(GhostEvent::Cleared { list });
            }
        }
    }

    /// Takes every queued archive event, oldest first.
    pub(crate) fn take_pending(&mut self) -> Vec<GhostEvent<K, V>> {
        mem::take(&mut self.pending)
    }

    /// Delivers queued events to `archive` in order.
    pub(crate) fn flush_to(&mut self, archive: &mut dyn GhostArchive<K, V>) {
        if !self.pending.is_empty() {
            archive::dispatch(archive, self.pending.drain(..), &*self.logger);
        }
    }

    pub(crate) fn keys(&self, kind: ListKind) -> impl Iterator<Item = &K> + '_ {
        self.lists[kind.index()]
            .iter(&self.arena)
            .map(|(_, entry)| &entry.key)
    }

    pub(crate) fn snapshot(&self) -> ArcSnapshot<K> {
        let collect = |kind: ListKind| -> Vec<K> { self.keys(kind).cloned().collect() };
        ArcSnapshot {
            capacity: self.capacity.get(),
            target_t1: self.p,
            len: self.len(),
            t1: collect(ListKind::T1),
            t2: collect(ListKind::T2),
            b1: collect(ListKind::B1),
            b2: collect(ListKind::B2),
        }
    }

    /// Panics if any list, tag, index entry or size bound is inconsistent.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants(&self) {
        let c = self.capacity.get();
        let mut linked = 0;
        for kind in ListKind::ALL {
            for id in self.lists[kind.index()].debug_validate(&self.arena) {
                let entry = self.entry(id);
                assert_eq!(entry.list(), kind, "entry tag does not match its list");
                assert_eq!(
                    entry.value().is_some(),
                    kind.is_resident(),
                    "value presence does not match tier in {kind}"
                );
                assert_eq!(
                    self.map.get(&entry.key).copied(),
                    Some(id),
                    "index does not point at the linked slot"
                );
                linked += 1;
            }
        }
        assert_eq!(linked, self.arena.len(), "arena holds unlinked entries");
        assert_eq!(linked, self.map.len(), "index size differs from lists");

        let (t1, t2, b1, b2) = self.list_lengths();
        assert!(t1 + t2 <= c, "resident set {} exceeds capacity {c}", t1 + t2);
        assert!(t1 + b1 <= c, "|T1| + |B1| = {} exceeds capacity {c}", t1 + b1);
        assert!(
            t1 + t2 + b1 + b2 <= 2 * c,
            "directory size {} exceeds 2c",
            t1 + t2 + b1 + b2
        );
        assert!(self.p <= c, "p = {} exceeds capacity {c}", self.p);
    }
}

impl<K, V, S> fmt::Debug for ArcSegment<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcSegment")
            .field("capacity", &self.capacity)
            .field("p", &self.p)
            .field("t1", &self.lists[T1].len())
            .field("t2", &self.lists[T2].len())
            .field("b1", &self.lists[ListKind::B1.index()].len())
            .field("b2", &self.lists[ListKind::B2.index()].len())
            .finish()
    }
}

/// Point-in-time view of the four lists, each ordered MRU to LRU.
///
/// The `Display` form is a human-readable dump of the whole cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcSnapshot<K> {
    /// Capacity `c`.
    pub capacity: usize,
    /// Adaptive target `p` for `T1`.
    pub target_t1: usize,
    /// Resident entries.
    pub len: usize,
    /// Keys in `T1`.
    pub t1: Vec<K>,
    /// Keys in `T2`.
    pub t2: Vec<K>,
    /// Keys in `B1`.
    pub b1: Vec<K>,
    /// Keys in `B2`.
    pub b2: Vec<K>,
}

impl<K> ArcSnapshot<K> {
    /// Keys of one list.
    pub fn list(&self, kind: ListKind) -> &[K] {
        match kind {
            ListKind::T1 => &self.t1,
            ListKind::T2 => &self.t2,
            ListKind::B1 => &self.b1,
            ListKind::B2 => &self.b2,
        }
    }

    /// List holding `key`, if any.
    pub fn locate(&self, key: &K) -> Option<ListKind>
    where
        K: PartialEq,
    {
        ListKind::ALL
            .into_iter()
            .find(|kind| self.list(*kind).contains(key))
    }
}

impl<K: fmt::Debug> fmt::Display for ArcSnapshot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ARC capacity={} p={} len={}",
            self.capacity, self.target_t1, self.len
        )?;
        for kind in ListKind::ALL {
            writeln!(f, "  {kind}: {:?}", self.list(kind))?;
        }
        Ok(())
    }
}

/// An Adaptive Replacement Cache.
///
/// Holds at most `capacity` values and remembers up to another `capacity`
/// recently evicted keys, which it uses to decide whether recency or
/// frequency deserves more of the space.
///
/// # Examples
///
/// ```
/// use arc_cache::ArcCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = ArcCache::new(NonZeroUsize::new(2).unwrap());
///
/// assert!(!cache.put("apple", 1));
/// assert!(!cache.put("banana", 2));
///
/// // A second reference moves "banana" to the frequency side.
/// assert_eq!(cache.get(&"banana"), Some(&2));
///
/// // "apple" is demoted to a ghost to make room.
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"apple"), None);
/// assert_eq!(cache.len(), 2);
///
/// // Putting a ghost back resurrects it; it was known, so `put` says so.
/// assert!(cache.put("apple", 4));
/// assert_eq!(cache.get(&"apple"), Some(&4));
/// ```
pub struct ArcCache<K, V, S = DefaultHashBuilder> {
    segment: ArcSegment<K, V, S>,
    archive: Option<Box<dyn GhostArchive<K, V>>>,
}

impl<K: Hash + Eq + Clone, V> ArcCache<K, V, DefaultHashBuilder> {
    /// Creates a cache holding up to `capacity` values, with no logger and
    /// no archive.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::init(ArcCacheConfig::new(capacity), None)
    }

    /// Like [`new`](Self::new), but rejects a zero capacity with an error.
    pub fn try_new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self::new(capacity))
    }

    /// Builds a cache from a configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Capacity and collaborators
    /// * `hasher` - Optional hash builder; `None` uses the default one
    ///
    /// # Example
    ///
    /// ```
    /// use arc_cache::config::ArcCacheConfig;
    /// use arc_cache::ArcCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let config = ArcCacheConfig::new(NonZeroUsize::new(100).unwrap());
    /// let mut cache = ArcCache::init(config, None);
    /// cache.put(1u32, "one");
    /// assert_eq!(cache.peek(&1), Some(&"one"));
    /// ```
    pub fn init(config: ArcCacheConfig<K, V>, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> ArcCache<K, V, S> {
    /// Builds a cache from a configuration and a custom hash builder.
    pub fn init_with_hasher(config: ArcCacheConfig<K, V>, hash_builder: S) -> Self {
        let ArcCacheConfig {
            capacity,
            logger,
            archive,
        } = config;
        logger.info(
            "arc cache created",
            &[("capacity", &capacity), ("archive", &archive.is_some())],
        );
        Self {
            segment: ArcSegment::with_hasher(capacity, hash_builder, logger, archive.is_some()),
            archive,
        }
    }

    /// Maximum number of resident values.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.cap()
    }

    /// Number of resident values. Ghosts are not counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if no value is resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Current adaptive target size for `T1` (`p`).
    #[inline]
    pub fn target_t1(&self) -> usize {
        self.segment.target_t1()
    }

    /// Lengths of `(T1, T2, B1, B2)`.
    #[inline]
    pub fn list_lengths(&self) -> (usize, usize, usize, usize) {
        self.segment.list_lengths()
    }

    /// Looks up `key`, counting the access.
    ///
    /// A resident key moves to the front of `T2`. A ghost reports `None` but
    /// still adjusts `p` the first time it is looked up.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Like [`get`](Self::get), returning a mutable reference.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Reads a resident value without counting an access.
    #[inline]
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.peek(key)
    }

    /// Returns `true` if `key` is resident. Ghosts do not count.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.contains_key(key)
    }

    /// Inserts or updates `key`.
    ///
    /// Returns `true` if the key was already known, either resident or as a
    /// ghost. Never fails: room is made by demoting or forgetting entries.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let existed = self.segment.put(key, value);
        self.flush_archive();
        existed
    }

    /// Removes `key` from the cache and from its ghost history.
    ///
    /// Returns the value only if the key was resident.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let value = self.segment.remove(key);
        self.flush_archive();
        value
    }

    /// Drops every resident value and all ghost history, and resets `p`.
    pub fn clear(&mut self) {
        self.segment.clear();
        self.flush_archive();
    }

    /// Iterates the keys of one list, MRU first.
    pub fn keys(&self, kind: ListKind) -> impl Iterator<Item = &K> + '_ {
        self.segment.keys(kind)
    }

    /// Captures the current directory for inspection or display.
    pub fn snapshot(&self) -> ArcSnapshot<K> {
        self.segment.snapshot()
    }

    /// Checks every structural and size invariant, panicking on violation.
    #[cfg(any(test, debug_assertions))]
    #[doc(hidden)]
    pub fn debug_validate_invariants(&self) {
        self.segment.debug_validate_invariants();
    }

    fn flush_archive(&mut self) {
        if let Some(archive) = self.archive.as_deref_mut() {
            self.segment.flush_to(archive);
        }
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> CacheMetrics for ArcCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}

impl<K, V, S> fmt::Debug for ArcCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCache")
            .field("segment", &self.segment)
            .field("archive", &self.archive.is_some())
            .finish()
    }
}
