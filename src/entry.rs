//! ARC Cache Entry
//!
//! One `ArcEntry` exists per indexed key. It is stored in the segment's slot
//! arena and moves between the four lists by relinking; the entry itself is
//! never copied. The `list` tag records which list the node is linked into.
//!
//! A resident entry (`T1`/`T2`) always carries a value. A ghost entry
//! (`B1`/`B2`) never does: demotion hands the value to the ghost archive, or
//! drops it, and resurrection stores the new value supplied by `put`.

use crate::meta::ListKind;
use core::fmt;

pub(crate) struct ArcEntry<K, V> {
    pub(crate) key: K,
    value: Option<V>,
    list: ListKind,
    /// Set once a ghost lookup has already shifted `p` for this ghost, so a
    /// later resurrection does not count the same history hit twice.
    adapted: bool,
}

impl<K, V> ArcEntry<K, V> {
    /// A freshly admitted entry. Placement always starts in `T1`.
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value: Some(value),
            list: ListKind::T1,
            adapted: false,
        }
    }

    #[inline]
    pub(crate) fn list(&self) -> ListKind {
        self.list
    }

    #[inline]
    pub(crate) fn is_ghost(&self) -> bool {
        self.list.is_ghost()
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    #[inline]
    pub(crate) fn adapted(&self) -> bool {
        self.adapted
    }

    pub(crate) fn mark_adapted(&mut self) {
        self.adapted = true;
    }

    /// Retags a resident entry as `T2`.
    pub(crate) fn promote(&mut self) {
        debug_assert!(self.list.is_resident());
        self.list = ListKind::T2;
    }

    /// Turns a resident entry into a ghost of the matching history list and
    /// hands back the value it held.
    pub(crate) fn demote(&mut self) -> V {
        let Some(ghost) = self.list.demotion_target() else {
            panic!("cannot demote an entry already in {}", self.list);
        };
        self.list = ghost;
        self.adapted = false;
        self.value
            .take()
            .expect("resident entry must hold a value")
    }

    /// Brings a ghost back into `T2` with a fresh value.
    pub(crate) fn resurrect(&mut self, value: V) {
        debug_assert!(self.is_ghost());
        self.list = ListKind::T2;
        self.adapted = false;
        self.value = Some(value);
    }

    /// Replaces the value of a resident entry.
    pub(crate) fn replace_value(&mut self, value: V) -> Option<V> {
        debug_assert!(self.list.is_resident());
        self.value.replace(value)
    }

    pub(crate) fn into_value(self) -> Option<V> {
        self.value
    }
}

impl<K: fmt::Debug, V> fmt::Debug for ArcEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcEntry")
            .field("key", &self.key)
            .field("list", &self.list)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}
