#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## How ARC Spends Its Capacity
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                       ArcCache (capacity c)                        │
//! │                                                                    │
//! │   B1 ghosts      T1 resident  ┃  T2 resident      B2 ghosts        │
//! │   keys only      seen once    ┃  seen twice+      keys only        │
//! │                               ┃                                    │
//! │   hit in B1 ──▶ p grows       ┃       p shrinks ◀── hit in B2      │
//! │                               ┃                                    │
//! │   |T1| + |T2| ≤ c     |T1| + |B1| ≤ c     |T1|+|T2|+|B1|+|B2| ≤ 2c │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use arc_cache::ArcCache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = ArcCache::new(NonZeroUsize::new(2).unwrap());
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");      // "a" moves to the frequency side (T2)
//! cache.put("c", 3);    // "b" is demoted to a ghost in B1
//!
//! assert_eq!(cache.get(&"b"), None);
//! assert_eq!(cache.target_t1(), 1); // the ghost hit favoured recency
//! assert!(cache.put("b", 4));       // and `put` brings it back into T2
//! ```
//!
//! ## Observing the Cache
//!
//! ```rust
//! use arc_cache::{ArcCache, CacheMetrics, ListKind};
//! use core::num::NonZeroUsize;
//!
//! let mut cache = ArcCache::new(NonZeroUsize::new(3).unwrap());
//! for key in 0..5 {
//!     cache.put(key, key * 10);
//! }
//!
//! let snapshot = cache.snapshot();
//! assert_eq!(snapshot.t1, [4, 3, 2]);
//! assert_eq!(snapshot.locate(&4), Some(ListKind::T1));
//! println!("{snapshot}");
//!
//! let metrics = cache.metrics();
//! assert_eq!(metrics.get("cache_hits"), Some(&0.0));
//! assert_eq!(metrics.get("t1_evictions"), Some(&2.0));
//! ```
//!
//! ## Ghost Archive
//!
//! An archive receives the value of every key demoted into `B1`/`B2` and is
//! told when those keys leave history again. It is advisory: failures are
//! logged and the cache carries on.
//!
//! ```rust
//! use arc_cache::{ArcCache, ArcCacheConfig, GhostArchive, GhostList, ArchiveError};
//! use core::num::NonZeroUsize;
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl GhostArchive<&'static str, i32> for Counter {
//!     fn push_front(&mut self, _: GhostList, _: &&'static str, _: i32) -> Result<(), ArchiveError> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//!     fn drop_entry(&mut self, _: GhostList, _: &&'static str) -> Result<(), ArchiveError> {
//!         Ok(())
//!     }
//!     fn forget(&mut self, _: GhostList) -> Result<(), ArchiveError> {
//!         Ok(())
//!     }
//! }
//!
//! let config = ArcCacheConfig::new(NonZeroUsize::new(1).unwrap()).with_archive(Counter::default());
//! let mut cache = ArcCache::init(config, None);
//! cache.put("a", 1);
//! cache.get(&"a");
//! cache.put("b", 2); // "a" leaves T2 for B2
//! ```
//!
//! ## Concurrent Cache
//!
//! Enable the `concurrent` feature for `ConcurrentArcCache`, which guards a
//! single ARC state with one `parking_lot::Mutex`:
//!
//! ```toml
//! [dependencies]
//! arc-cache = { version = "0.1", features = ["concurrent"] }
//! ```
//!
//! ## Modules
//!
//! - [`arc`]: The ARC cache and its directory snapshot
//! - [`meta`]: List membership tags
//! - [`config`]: Construction-time configuration
//! - [`archive`]: Ghost archive collaborator
//! - [`logger`]: Leveled logging collaborator
//! - [`error`]: Error types
//! - [`metrics`]: Metrics collection
//! - `concurrent`: Thread-safe cache (requires `concurrent` feature)

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Arena-backed ordered lists.
///
/// Internal infrastructure: every list shares one slot arena, and entries are
/// moved between lists by relinking their slot.
pub(crate) mod list;

/// List membership tags (`T1`, `T2`, `B1`, `B2`).
pub mod meta;

/// Cache entry stored in the arena.
pub(crate) mod entry;

/// Cache configuration structures.
pub mod config;

/// Error types.
pub mod error;

/// Injectable leveled logging.
pub mod logger;

/// Ghost archive collaborator and the in-memory reference archive.
pub mod archive;

/// Cache metrics system.
///
/// Each cache reports its counters as a `BTreeMap<String, f64>` through the
/// [`CacheMetrics`] trait.
pub mod metrics;

/// Adaptive Replacement Cache implementation.
pub mod arc;

/// Thread-safe ARC cache.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use arc::{ArcCache, ArcSnapshot};
pub use archive::{GhostArchive, GhostEvent, MemoryArchive};
pub use config::ArcCacheConfig;
pub use error::{ArchiveError, CacheError};
pub use logger::{Level, Logger, NoopLogger};
pub use meta::{GhostList, ListKind};
pub use metrics::{ArcCacheMetrics, CacheMetrics};

#[cfg(feature = "tracing")]
pub use logger::TracingLogger;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentArcCache;
