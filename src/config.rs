//! Cache Configuration
//!
//! Configuration is an explicit struct with public fields, handed to
//! [`ArcCache::init`](crate::ArcCache::init) (or
//! `ConcurrentArcCache::init` with the `concurrent` feature). The only
//! required setting is the capacity; the collaborators default to no-ops:
//!
//! | Field      | Default            | Purpose                                   |
//! |------------|--------------------|-------------------------------------------|
//! | `capacity` | required           | `c`, the maximum number of resident keys  |
//! | `logger`   | [`NoopLogger`]     | receives adaptation and archive events    |
//! | `archive`  | `None`             | mirrors the ghost lists, best effort      |
//!
//! Capacity is fixed for the lifetime of the cache. Ghost bookkeeping adds up
//! to another `c` keys (without values) on top of the resident set.
//!
//! # Examples
//!
//! ```
//! use arc_cache::archive::MemoryArchive;
//! use arc_cache::config::ArcCacheConfig;
//! use arc_cache::ArcCache;
//! use core::num::NonZeroUsize;
//!
//! // Capacity only
//! let config = ArcCacheConfig::new(NonZeroUsize::new(1024).unwrap());
//! let cache: ArcCache<String, Vec<u8>> = ArcCache::init(config, None);
//! assert_eq!(cache.cap().get(), 1024);
//!
//! // Keep an in-memory copy of the ghost history
//! let config = ArcCacheConfig::new(NonZeroUsize::new(64).unwrap())
//!     .with_archive(MemoryArchive::<u64, String>::new());
//! let cache: ArcCache<u64, String> = ArcCache::init(config, None);
//! assert!(cache.is_empty());
//! ```

extern crate alloc;

use crate::archive::GhostArchive;
use crate::logger::{Logger, NoopLogger};
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an [`ArcCache`](crate::ArcCache).
pub struct ArcCacheConfig<K, V> {
    /// Maximum number of resident entries (`c`).
    pub capacity: NonZeroUsize,
    /// Sink for log events.
    pub logger: Arc<dyn Logger>,
    /// Optional ghost-list mirror. When `None`, demoted values are dropped.
    pub archive: Option<Box<dyn GhostArchive<K, V>>>,
}

impl<K, V> ArcCacheConfig<K, V> {
    /// Capacity-only configuration with a no-op logger and no archive.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            logger: Arc::new(NoopLogger),
            archive: None,
        }
    }

    /// Replaces the logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Attaches a ghost archive.
    pub fn with_archive<A>(mut self, archive: A) -> Self
    where
        A: GhostArchive<K, V> + 'static,
    {
        self.archive = Some(Box::new(archive));
        self
    }
}

impl<K, V> fmt::Debug for ArcCacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCacheConfig")
            .field("capacity", &self.capacity)
            .field("archive", &self.archive.is_some())
            .finish_non_exhaustive()
    }
}

/// Configuration for a `ConcurrentArcCache`.
///
/// The thread-safe cache guards a single ARC instance, so it takes exactly
/// the same settings.
pub type ConcurrentArcCacheConfig<K, V> = ArcCacheConfig<K, V>;
