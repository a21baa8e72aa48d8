//! ARC Cache Metrics

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use crate::meta::{GhostList, ListKind};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// ARC-specific counters on top of [`CoreCacheMetrics`].
///
/// Ghost hits are counted separately from resident hits: they are misses as
/// far as the caller is concerned, but they are what drives `p`.
#[derive(Debug, Clone)]
pub struct ArcCacheMetrics {
    /// Counters shared by every cache.
    pub core: CoreCacheMetrics,

    /// Capacity `c`.
    pub capacity: u64,

    /// Current adaptive target for `|T1|`.
    pub target_t1: u64,

    /// Current list lengths, refreshed after every mutation.
    pub t1_size: u64,
    /// See `t1_size`.
    pub t2_size: u64,
    /// See `t1_size`.
    pub b1_size: u64,
    /// See `t1_size`.
    pub b2_size: u64,

    /// Hits served from `T1`.
    pub t1_hits: u64,
    /// Hits served from `T2`.
    pub t2_hits: u64,

    /// Requests that landed on a `B1` ghost.
    pub b1_ghost_hits: u64,
    /// Requests that landed on a `B2` ghost.
    pub b2_ghost_hits: u64,

    /// `T1` entries moved to `T2` by a second reference.
    pub promotions: u64,
    /// Ghosts re-admitted into `T2` by `put`.
    pub resurrections: u64,

    /// `T1` entries demoted into `B1`.
    pub t1_demotions: u64,
    /// `T2` entries demoted into `B2`.
    pub t2_demotions: u64,

    /// `T1` entries dropped with no ghost kept (B1 had no room).
    pub t1_evictions: u64,
    /// Ghost entries permanently forgotten from `B1` or `B2`.
    pub ghost_evictions: u64,

    /// Number of times `p` was recomputed.
    pub adaptations: u64,
}

impl ArcCacheMetrics {
    /// Zeroed counters for a cache of `capacity` entries.
    pub fn new(max_cache_size_bytes: u64, capacity: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(max_cache_size_bytes),
            capacity,
            target_t1: 0,
            t1_size: 0,
            t2_size: 0,
            b1_size: 0,
            b2_size: 0,
            t1_hits: 0,
            t2_hits: 0,
            b1_ghost_hits: 0,
            b2_ghost_hits: 0,
            promotions: 0,
            resurrections: 0,
            t1_demotions: 0,
            t2_demotions: 0,
            t1_evictions: 0,
            ghost_evictions: 0,
            adaptations: 0,
        }
    }

    /// Records a resident hit in `list` (`T1` or `T2`).
    pub fn record_resident_hit(&mut self, list: ListKind, object_size: u64) {
        self.core.record_hit(object_size);
        match list {
            ListKind::T1 => {
                self.t1_hits += 1;
                self.promotions += 1;
            }
            ListKind::T2 => self.t2_hits += 1,
            ListKind::B1 | ListKind::B2 => {
                debug_assert!(false, "ghost hit recorded as resident");
            }
        }
    }

    /// Records a request that found a ghost of `list`.
    pub fn record_ghost_hit(&mut self, list: GhostList) {
        match list {
            GhostList::B1 => self.b1_ghost_hits += 1,
            GhostList::B2 => self.b2_ghost_hits += 1,
        }
    }

    /// Records a resident entry turned into a ghost of `list`.
    pub fn record_demotion(&mut self, list: GhostList, object_size: u64) {
        match list {
            GhostList::B1 => self.t1_demotions += 1,
            GhostList::B2 => self.t2_demotions += 1,
        }
        self.core.record_eviction(object_size);
    }

    /// Records a `T1` entry dropped without leaving a ghost.
    pub fn record_t1_eviction(&mut self, object_size: u64) {
        self.t1_evictions += 1;
        self.core.record_eviction(object_size);
    }

    /// Records a ghost forgotten for good.
    pub fn record_ghost_eviction(&mut self) {
        self.ghost_evictions += 1;
    }

    /// Records a ghost re-admitted into the resident set.
    pub fn record_resurrection(&mut self, object_size: u64) {
        self.resurrections += 1;
        self.core.record_insertion(object_size);
    }

    /// Records a new value for `p`.
    pub fn record_adaptation(&mut self, target_t1: usize) {
        self.adaptations += 1;
        self.target_t1 = target_t1 as u64;
    }

    /// Refreshes the list gauges.
    pub fn update_list_sizes(&mut self, (t1, t2, b1, b2): (usize, usize, usize, usize)) {
        self.t1_size = t1 as u64;
        self.t2_size = t2 as u64;
        self.b1_size = b1 as u64;
        self.b2_size = b2 as u64;
    }

    /// Fraction of all requests that hit a ghost. A high value means the
    /// cache is just too small for the working set.
    pub fn ghost_hit_rate(&self) -> f64 {
        if self.core.requests > 0 {
            (self.b1_ghost_hits + self.b2_ghost_hits) as f64 / self.core.requests as f64
        } else {
            0.0
        }
    }

    /// `p / c`: how much of the cache is currently aimed at recency.
    pub fn recency_bias(&self) -> f64 {
        if self.capacity > 0 {
            self.target_t1 as f64 / self.capacity as f64
        } else {
            0.0
        }
    }

    /// All ARC counters plus the core ones.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert("capacity".to_string(), self.capacity as f64);
        metrics.insert("target_t1".to_string(), self.target_t1 as f64);
        metrics.insert("recency_bias".to_string(), self.recency_bias());

        metrics.insert("t1_size".to_string(), self.t1_size as f64);
        metrics.insert("t2_size".to_string(), self.t2_size as f64);
        metrics.insert("b1_size".to_string(), self.b1_size as f64);
        metrics.insert("b2_size".to_string(), self.b2_size as f64);

        metrics.insert("t1_hits".to_string(), self.t1_hits as f64);
        metrics.insert("t2_hits".to_string(), self.t2_hits as f64);
        metrics.insert("b1_ghost_hits".to_string(), self.b1_ghost_hits as f64);
        metrics.insert("b2_ghost_hits".to_string(), self.b2_ghost_hits as f64);
        metrics.insert("ghost_hit_rate".to_string(), self.ghost_hit_rate());

        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("resurrections".to_string(), self.resurrections as f64);
        metrics.insert("t1_demotions".to_string(), self.t1_demotions as f64);
        metrics.insert("t2_demotions".to_string(), self.t2_demotions as f64);
        metrics.insert("t1_evictions".to_string(), self.t1_evictions as f64);
        metrics.insert("ghost_evictions".to_string(), self.ghost_evictions as f64);
        metrics.insert("adaptations".to_string(), self.adaptations as f64);

        metrics
    }
}

impl CacheMetrics for ArcCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "ARC"
    }
}
