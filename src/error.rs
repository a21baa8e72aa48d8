//! Error types.
//!
//! Only construction and the ghost archive side channel can fail. Lookups and
//! insertions never return errors: capacity is self-managing, and archive
//! failures are logged and swallowed so they cannot abort a state transition.

extern crate alloc;

use crate::meta::GhostList;
use alloc::string::String;

/// Errors returned when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// A capacity of zero was requested.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}

/// Errors reported by a [`GhostArchive`](crate::archive::GhostArchive).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// The backing store could not be reached.
    #[error("ghost archive unavailable: {0}")]
    Unavailable(String),

    /// The backing store refused an operation on one list.
    #[error("ghost archive rejected operation on {list}: {reason}")]
    Rejected {
        /// List the operation targeted.
        list: GhostList,
        /// Backend-specific reason.
        reason: String,
    },
}
