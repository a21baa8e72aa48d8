//! Ghost Archive
//!
//! A ghost archive is an optional, best-effort side channel that mirrors the
//! two ghost lists (`B1`, `B2`) somewhere outside the cache, typically for
//! audit or warm-restart purposes. It is never consulted by the eviction
//! algorithm and holds no correctness invariants of its own.
//!
//! The cache reports three kinds of transitions:
//!
//! | Transition                                   | Archive call                 |
//! |----------------------------------------------|------------------------------|
//! | resident entry demoted into `B1`/`B2`        | [`GhostArchive::push_front`] |
//! | ghost permanently evicted, resurrected or removed | [`GhostArchive::drop_entry`] |
//! | cache cleared                                | [`GhostArchive::forget`] per list |
//!
//! Transitions are first recorded as [`GhostEvent`]s inside the cache and then
//! dispatched in order once the in-memory state change is complete. An archive
//! error is logged at `warn` and the remaining events are still delivered; the
//! cache state is never rolled back.
//!
//! # Example
//!
//! ```
//! use arc_cache::archive::{GhostArchive, MemoryArchive};
//! use arc_cache::meta::GhostList;
//!
//! let mut archive: MemoryArchive<&str, i32> = MemoryArchive::new();
//! archive.push_front(GhostList::B1, &"a", 1).unwrap();
//! archive.push_front(GhostList::B1, &"b", 2).unwrap();
//! assert_eq!(archive.keys(GhostList::B1).collect::<Vec<_>>(), [&"b", &"a"]);
//!
//! archive.drop_entry(GhostList::B1, &"a").unwrap();
//! assert_eq!(archive.len(GhostList::B1), 1);
//! ```

extern crate alloc;

use crate::error::ArchiveError;
use crate::logger::Logger;
use crate::meta::GhostList;
use alloc::collections::VecDeque;
use core::fmt;

/// External store notified about ghost-list transitions.
pub trait GhostArchive<K, V>: Send {
    /// A resident entry was demoted to the front of `list`. `value` is the
    /// value it held; the in-memory ghost keeps none.
    fn push_front(&mut self, list: GhostList, key: &K, value: V) -> Result<(), ArchiveError>;

    /// `key` left `list` for good or was resurrected into the resident set.
    fn drop_entry(&mut self, list: GhostList, key: &K) -> Result<(), ArchiveError>;

    /// Every ghost in `list` was discarded at once.
    fn forget(&mut self, list: GhostList) -> Result<(), ArchiveError>;
}

/// A ghost-list transition waiting to be delivered to an archive.
#[derive(Clone, PartialEq, Eq)]
pub enum GhostEvent<K, V> {
    /// `key` was pushed to the front of `list`.
    Demoted {
        /// Destination ghost list.
        list: GhostList,
        /// Demoted key.
        key: K,
        /// Value the entry held while resident.
        value: V,
    },
    /// `key` was removed from `list`.
    Dropped {
        /// Ghost list the key left.
        list: GhostList,
        /// Removed key.
        key: K,
    },
    /// `list` was emptied.
    Cleared {
        /// Emptied ghost list.
        list: GhostList,
    },
}

impl<K, V> GhostEvent<K, V> {
    /// Ghost list the event concerns.
    pub fn list(&self) -> GhostList {
        match self {
            GhostEvent::Demoted { list, .. }
            | GhostEvent::Dropped { list, .. }
            | GhostEvent::Cleared { list } => *list,
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            GhostEvent::Demoted { .. } => "push_front",
            GhostEvent::Dropped { .. } => "drop_entry",
            GhostEvent::Cleared { .. } => "forget",
        }
    }

    /// Delivers this event to `archive`.
    pub fn apply<A>(self, archive: &mut A) -> Result<(), ArchiveError>
    where
        A: GhostArchive<K, V> + ?Sized,
    {
        match self {
            GhostEvent::Demoted { list, key, value } => archive.push_front(list, &key, value),
            GhostEvent::Dropped { list, key } => archive.drop_entry(list, &key),
            GhostEvent::Cleared { list } => archive.forget(list),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for GhostEvent<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GhostEvent::Demoted { list, key, .. } => f
                .debug_struct("Demoted")
                .field("list", list)
                .field("key", key)
                .finish_non_exhaustive(),
            GhostEvent::Dropped { list, key } => f
                .debug_struct("Dropped")
                .field("list", list)
                .field("key", key)
                .finish(),
            GhostEvent::Cleared { list } => f.debug_struct("Cleared").field("list", list).finish(),
        }
    }
}

/// Delivers `events` in order. Failures are logged and skipped.
pub(crate) fn dispatch<K, V, I>(archive: &mut dyn GhostArchive<K, V>, events: I, logger: &dyn Logger)
where
    I: IntoIterator<Item = GhostEvent<K, V>>,
{
    for event in events {
        let list = event.list();
        let operation = event.operation();
        if let Err(err) = event.apply(archive) {
            logger.warn(
                "ghost archive operation failed",
                &[("operation", &operation), ("list", &list), ("error", &err)],
            );
        }
    }
}

/// In-memory archive keeping each ghost list as a deque, MRU at the front.
///
/// Useful for inspecting the ghost history of a cache or for carrying it
/// across a cache rebuild.
pub struct MemoryArchive<K, V> {
    lists: [VecDeque<(K, V)>; 2],
}

impl<K, V> MemoryArchive<K, V> {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self {
            lists: [VecDeque::new(), VecDeque::new()],
        }
    }

    fn slot(list: GhostList) -> usize {
        match list {
            GhostList::B1 => 0,
            GhostList::B2 => 1,
        }
    }

    /// Number of archived ghosts in `list`.
    pub fn len(&self, list: GhostList) -> usize {
        self.lists[Self::slot(list)].len()
    }

    /// Returns `true` if neither list holds anything.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(VecDeque::is_empty)
    }

    /// Archived `(key, value)` pairs of `list`, most recent first.
    pub fn entries(&self, list: GhostList) -> impl Iterator<Item = &(K, V)> + '_ {
        self.lists[Self::slot(list)].iter()
    }

    /// Archived keys of `list`, most recent first.
    pub fn keys(&self, list: GhostList) -> impl Iterator<Item = &K> + '_ {
        self.entries(list).map(|(k, _)| k)
    }
}

impl<K: PartialEq, V> MemoryArchive<K, V> {
    /// Looks up the archived value for `key` in `list`.
    pub fn get(&self, list: GhostList, key: &K) -> Option<&V> {
        self.entries(list).find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<K, V> Default for MemoryArchive<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> GhostArchive<K, V> for MemoryArchive<K, V>
where
    K: Clone + PartialEq + Send,
    V: Send,
{
    fn push_front(&mut self, list: GhostList, key: &K, value: V) -> Result<(), ArchiveError> {
        self.lists[Self::slot(list)].push_front((key.clone(), value));
        Ok(())
    }

    fn drop_entry(&mut self, list: GhostList, key: &K) -> Result<(), ArchiveError> {
        let entries = &mut self.lists[Self::slot(list)];
        match entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                entries.remove(pos);
                Ok(())
            }
            None => Err(ArchiveError::Rejected {
                list,
                reason: alloc::string::String::from("key is not archived"),
            }),
        }
    }

    fn forget(&mut self, list: GhostList) -> Result<(), ArchiveError> {
        self.lists[Self::slot(list)].clear();
        Ok(())
    }
}

impl<K, V> fmt::Debug for MemoryArchive<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryArchive")
            .field("b1", &self.lists[0].len())
            .field("b2", &self.lists[1].len())
            .finish()
    }
}
