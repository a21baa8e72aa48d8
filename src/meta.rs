//! List Membership Tags
//!
//! Every indexed key in an ARC cache lives in exactly one of four lists. The
//! tag stored on the entry is the only source of truth for that membership,
//! so "is this key a ghost" or "was this a B2 hit" is a plain enum comparison.
//!
//! | Tag  | Tier     | Contents                                   |
//! |------|----------|--------------------------------------------|
//! | `T1` | resident | keys referenced once since admission       |
//! | `T2` | resident | keys referenced at least twice             |
//! | `B1` | ghost    | keys recently demoted out of `T1`          |
//! | `B2` | ghost    | keys recently demoted out of `T2`          |
//!
//! # Usage
//!
//! ```
//! use arc_cache::meta::{GhostList, ListKind};
//!
//! assert!(ListKind::T2.is_resident());
//! assert!(ListKind::B1.is_ghost());
//! assert_eq!(ListKind::T1.demotion_target(), Some(ListKind::B1));
//! assert_eq!(ListKind::B2.ghost(), Some(GhostList::B2));
//! assert_eq!(ListKind::from(GhostList::B2), ListKind::B2);
//! ```

use core::fmt;

/// One of the four ARC lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Recency tier: resident keys seen once.
    T1,
    /// Frequency tier: resident keys seen at least twice.
    T2,
    /// History of keys demoted from `T1`.
    B1,
    /// History of keys demoted from `T2`.
    B2,
}

impl ListKind {
    /// All lists in storage order.
    pub const ALL: [ListKind; 4] = [ListKind::T1, ListKind::T2, ListKind::B1, ListKind::B2];

    /// Position of this list in a `[_; 4]` table.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ListKind::T1 => 0,
            ListKind::T2 => 1,
            ListKind::B1 => 2,
            ListKind::B2 => 3,
        }
    }

    /// Returns `true` for `B1` and `B2`.
    #[inline]
    pub const fn is_ghost(self) -> bool {
        matches!(self, ListKind::B1 | ListKind::B2)
    }

    /// Returns `true` for `T1` and `T2`.
    #[inline]
    pub const fn is_resident(self) -> bool {
        !self.is_ghost()
    }

    /// The archive identity of a ghost tag; `None` for resident tags.
    #[inline]
    pub const fn ghost(self) -> Option<GhostList> {
        match self {
            ListKind::B1 => Some(GhostList::B1),
            ListKind::B2 => Some(GhostList::B2),
            ListKind::T1 | ListKind::T2 => None,
        }
    }

    /// The ghost list a resident entry falls into when demoted.
    #[inline]
    pub const fn demotion_target(self) -> Option<ListKind> {
        match self {
            ListKind::T1 => Some(ListKind::B1),
            ListKind::T2 => Some(ListKind::B2),
            ListKind::B1 | ListKind::B2 => None,
        }
    }

    /// Short display name (`"T1"`, `"B2"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            ListKind::T1 => "T1",
            ListKind::T2 => "T2",
            ListKind::B1 => "B1",
            ListKind::B2 => "B2",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a ghost list toward a [`GhostArchive`](crate::archive::GhostArchive).
///
/// Archives key their storage by this name, so the `Display` form is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GhostList {
    /// History of `T1` demotions.
    B1,
    /// History of `T2` demotions.
    B2,
}

impl GhostList {
    /// Both ghost lists.
    pub const ALL: [GhostList; 2] = [GhostList::B1, GhostList::B2];

    /// Stable list name used by archives.
    pub const fn as_str(self) -> &'static str {
        match self {
            GhostList::B1 => "B1",
            GhostList::B2 => "B2",
        }
    }
}

impl From<GhostList> for ListKind {
    fn from(list: GhostList) -> Self {
        match list {
            GhostList::B1 => ListKind::B1,
            GhostList::B2 => ListKind::B2,
        }
    }
}

impl fmt::Display for GhostList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
