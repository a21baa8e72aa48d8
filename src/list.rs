//! Arena-backed doubly linked lists.
//!
//! All nodes live in a single [`SlotArena`] and are addressed by [`SlotId`].
//! A [`List`] is only a `head`/`tail`/`len` triple over that shared arena, so
//! several lists can thread through the same storage and a node can be moved
//! from one list to another by relinking, without reallocating or copying
//! the value it holds.
//!
//! ```text
//!   arena: SlotArena<T>
//!   ┌────────┬──────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }               │
//!   ├────────┼──────────────────────────────────────────┤
//!   │   0    │ { a, prev: None,    next: Some(2) }      │  list X: 0 ◀──▶ 2
//!   │   1    │ { b, prev: None,    next: None    }      │  list Y: 1
//!   │   2    │ { c, prev: Some(0), next: None    }      │
//!   │   3    │ <free>                                   │
//!   └────────┴──────────────────────────────────────────┘
//! ```
//!
//! The arena does not know which list a node belongs to. Callers keep that
//! membership themselves (the ARC controller stores it as a tag inside the
//! value) and must only unlink a node from the list it is linked into.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Stable handle to a node in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

impl SlotId {
    #[allow(dead_code)]
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Slab of list nodes with slot reuse.
pub(crate) struct SlotArena<T> {
    slots: Vec<Option<Node<T>>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in a fresh, unlinked node.
    pub(crate) fn insert(&mut self, value: T) -> SlotId {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        self.len += 1;
        SlotId(idx)
    }

    /// Frees the node and returns its value. The node must already be unlinked.
    pub(crate) fn remove(&mut self, id: SlotId) -> Option<T> {
        let node = self.slots.get_mut(id.0)?.take()?;
        debug_assert!(
            node.prev.is_none() && node.next.is_none(),
            "freed a node that is still linked"
        );
        self.free_list.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.value)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .map(|node| &mut node.value)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    fn node(&self, id: SlotId) -> &Node<T> {
        self.slots[id.0]
            .as_ref()
            .expect("linked slot must be occupied")
    }

    fn node_mut(&mut self, id: SlotId) -> &mut Node<T> {
        self.slots[id.0]
            .as_mut()
            .expect("linked slot must be occupied")
    }
}

impl<T> fmt::Debug for SlotArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotArena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .finish()
    }
}

/// An ordered sequence of arena nodes. Front is most recently used, back is
/// least recently used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct List {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl List {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[allow(dead_code)]
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[allow(dead_code)]
    #[inline]
    pub(crate) fn front(&self) -> Option<SlotId> {
        self.head
    }

    #[allow(dead_code)]
    #[inline]
    pub(crate) fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Links an unlinked node at the MRU end.
    pub(crate) fn push_front<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let old_head = self.head;
        {
            let node = arena.node_mut(id);
            debug_assert!(node.prev.is_none() && node.next.is_none());
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => arena.node_mut(head).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Links an unlinked node at the LRU end.
    ///
    /// ARC itself only inserts at the MRU end; this completes the ordered
    /// list operations.
    #[allow(dead_code)]
    pub(crate) fn push_back<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let old_tail = self.tail;
        {
            let node = arena.node_mut(id);
            debug_assert!(node.prev.is_none() && node.next.is_none());
            node.next = None;
            node.prev = old_tail;
        }
        match old_tail {
            Some(tail) => arena.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlinks the LRU node and returns its handle. The node stays allocated.
    pub(crate) fn pop_back<T>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.tail?;
        self.unlink(arena, id);
        Some(id)
    }

    /// Detaches `id` from wherever it sits in this list.
    ///
    /// `id` must currently be linked into `self`.
    pub(crate) fn unlink<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let (prev, next) = {
            let node = arena.node(id);
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => arena.node_mut(prev_id).next = next,
            None => {
                debug_assert_eq!(self.head, Some(id), "node is not linked into this list");
                self.head = next;
            }
        }
        match next {
            Some(next_id) => arena.node_mut(next_id).prev = prev,
            None => {
                debug_assert_eq!(self.tail, Some(id), "node is not linked into this list");
                self.tail = prev;
            }
        }

        let node = arena.node_mut(id);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    /// Forgets every link without touching the arena.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Iterates node handles from front (MRU) to back (LRU).
    pub(crate) fn iter<'a, T>(&self, arena: &'a SlotArena<T>) -> Iter<'a, T> {
        Iter {
            arena,
            current: self.head,
            remaining: self.len,
        }
    }
}

/// Front-to-back iterator over a [`List`].
pub(crate) struct Iter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.arena.node(id);
        self.current = node.next;
        self.remaining -= 1;
        Some((id, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(any(test, debug_assertions))]
impl List {
    /// Walks the list and asserts that every link is mirrored and the
    /// stored length matches. Returns the handles front to back.
    pub(crate) fn debug_validate<T>(&self, arena: &SlotArena<T>) -> Vec<SlotId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = arena.node(id);
            assert_eq!(node.prev, prev, "broken back link at slot {}", id.index());
            ids.push(id);
            assert!(ids.len() <= self.len, "list is longer than its length");
            prev = Some(id);
            current = node.next;
        }
        assert_eq!(self.tail, prev, "tail does not match last node");
        assert_eq!(ids.len(), self.len, "stored length is stale");
        ids
    }
}
