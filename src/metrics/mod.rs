//! Cache Metrics
//!
//! Counters are reported as a `BTreeMap<String, f64>` so the key order is
//! deterministic across runs, which keeps benchmark output and test
//! assertions stable.
//!
//! [`CoreCacheMetrics`] holds the request/hit/byte counters every cache
//! tracks. [`ArcCacheMetrics`] embeds it and adds the ARC-specific view:
//! which tier served a hit, how often each ghost list was hit, how entries
//! moved between lists, and the current value of the adaptive target `p`.
//!
//! Byte figures are estimates (`size_of::<K>() + size_of::<V>()` plus a fixed
//! per-entry overhead); they are meant for relative comparison, not for
//! memory accounting.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod arc;

pub use arc::ArcCacheMetrics;

/// Counters shared by every cache flavour.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Lookups made through `get`/`get_mut`.
    pub requests: u64,

    /// Lookups that found a resident entry.
    pub cache_hits: u64,

    /// Estimated bytes asked for by all lookups.
    pub total_bytes_requested: u64,

    /// Estimated bytes returned by hits.
    pub bytes_served_from_cache: u64,

    /// Estimated bytes stored by inserts and updates.
    pub bytes_written_to_cache: u64,

    /// Resident entries pushed out by capacity pressure.
    pub evictions: u64,

    /// Estimated bytes currently resident.
    pub cache_size_bytes: u64,

    /// Estimated bytes when every slot is filled.
    pub max_cache_size_bytes: u64,
}

impl CoreCacheMetrics {
    /// Creates zeroed counters for a cache whose full size is
    /// `max_cache_size_bytes`.
    pub fn new(max_cache_size_bytes: u64) -> Self {
        Self {
            max_cache_size_bytes,
            ..Default::default()
        }
    }

    /// Counts a lookup served from the resident set.
    pub fn record_hit(&mut self, object_size: u64) {
        self.requests += 1;
        self.cache_hits += 1;
        self.total_bytes_requested += object_size;
        self.bytes_served_from_cache += object_size;
    }

    /// Counts a lookup that found nothing resident, ghosts included.
    pub fn record_miss(&mut self, object_size: u64) {
        self.requests += 1;
        self.total_bytes_requested += object_size;
    }

    /// Counts a resident entry leaving because of capacity pressure.
    pub fn record_eviction(&mut self, evicted_size: u64) {
        self.evictions += 1;
        self.cache_size_bytes = self.cache_size_bytes.saturating_sub(evicted_size);
    }

    /// Accounts for a resident entry leaving without an eviction
    /// (explicit removal).
    pub fn record_removal(&mut self, removed_size: u64) {
        self.cache_size_bytes = self.cache_size_bytes.saturating_sub(removed_size);
    }

    /// Counts a new resident entry.
    pub fn record_insertion(&mut self, object_size: u64) {
        self.cache_size_bytes += object_size;
        self.bytes_written_to_cache += object_size;
    }

    /// Counts a value overwrite. Size estimates are per type, so the
    /// resident total does not move.
    pub fn record_update(&mut self, object_size: u64) {
        self.bytes_written_to_cache += object_size;
    }

    /// Resets the resident size after the cache was emptied.
    pub fn record_clear(&mut self) {
        self.cache_size_bytes = 0;
    }

    /// `cache_hits / requests`, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// `misses / requests`, or 0.0 before the first lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Share of requested bytes that came out of the cache.
    pub fn byte_hit_rate(&self) -> f64 {
        if self.total_bytes_requested > 0 {
            self.bytes_served_from_cache as f64 / self.total_bytes_requested as f64
        } else {
            0.0
        }
    }

    /// Resident bytes relative to a full cache.
    pub fn cache_utilization(&self) -> f64 {
        if self.max_cache_size_bytes > 0 {
            self.cache_size_bytes as f64 / self.max_cache_size_bytes as f64
        } else {
            0.0
        }
    }

    /// Flattens the counters and derived rates into a sorted map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("evictions".to_string(), self.evictions as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics.insert("byte_hit_rate".to_string(), self.byte_hit_rate());

        metrics.insert(
            "total_bytes_requested".to_string(),
            self.total_bytes_requested as f64,
        );
        metrics.insert(
            "bytes_served_from_cache".to_string(),
            self.bytes_served_from_cache as f64,
        );
        metrics.insert(
            "bytes_written_to_cache".to_string(),
            self.bytes_written_to_cache as f64,
        );

        metrics.insert("cache_size_bytes".to_string(), self.cache_size_bytes as f64);
        metrics.insert(
            "max_cache_size_bytes".to_string(),
            self.max_cache_size_bytes as f64,
        );
        metrics.insert("cache_utilization".to_string(), self.cache_utilization());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics access for cache implementations.
pub trait CacheMetrics {
    /// All counters and derived rates, keyed by metric name.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short algorithm identifier, e.g. `"ARC"`.
    fn algorithm_name(&self) -> &'static str;
}
