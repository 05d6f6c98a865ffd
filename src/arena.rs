//! Node arena: two parallel arrays (records and link bookkeeping) plus the
//! free list threaded through the bookkeeping array.
//!
//! ```text
//! records: [ Some(r0) | Some(r1) | None     | Some(r3) | None     ]
//! links:   [ Occ{..}  | Occ{..}  | Free{4}  | Occ{..}  | Free{NIL}]
//!                                  ^ first_free
//! ```
//!
//! A slot is either reachable from the tree root (occupied) or from
//! `first_free` (free), never both. The arena only resizes when told to.

use crate::index::{NodeIndex, MAX_CAPACITY};

/// Per-slot bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Free {
        next: NodeIndex,
    },
    Occupied {
        red: bool,
        left: NodeIndex,
        right: NodeIndex,
    },
}

/// The bookkeeping half of the arena.
#[derive(Clone, Debug)]
pub(crate) struct Links {
    slots: Vec<Slot>,
    first_free: NodeIndex,
    len: usize,
}

impl Links {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: NodeIndex::NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn first_free(&self) -> NodeIndex {
        self.first_free
    }

    #[inline]
    pub(crate) fn slot(&self, idx: NodeIndex) -> Slot {
        assert!(!idx.is_nil(), "NIL dereference");
        self.slots[idx.get()]
    }

    #[inline]
    pub(crate) fn is_occupied(&self, idx: NodeIndex) -> bool {
        !idx.is_nil() && matches!(self.slots.get(idx.get()), Some(Slot::Occupied { .. }))
    }

    #[inline]
    fn occupied(&self, idx: NodeIndex) -> (bool, NodeIndex, NodeIndex) {
        match self.slot(idx) {
            Slot::Occupied { red, left, right } => (red, left, right),
            Slot::Free { .. } => panic!("slot {idx} is free"),
        }
    }

    #[inline]
    fn occupied_mut(&mut self, idx: NodeIndex) -> (&mut bool, &mut NodeIndex, &mut NodeIndex) {
        assert!(!idx.is_nil(), "NIL dereference");
        match &mut self.slots[idx.get()] {
            Slot::Occupied { red, left, right } => (red, left, right),
            Slot::Free { .. } => panic!("slot {idx} is free"),
        }
    }

    #[inline]
    pub(crate) fn left(&self, idx: NodeIndex) -> NodeIndex {
        self.occupied(idx).1
    }

    #[inline]
    pub(crate) fn right(&self, idx: NodeIndex) -> NodeIndex {
        self.occupied(idx).2
    }

    /// NIL links count as black.
    #[inline]
    pub(crate) fn is_red(&self, idx: NodeIndex) -> bool {
        !idx.is_nil() && self.occupied(idx).0
    }

    #[inline]
    pub(crate) fn set_left(&mut self, idx: NodeIndex, child: NodeIndex) {
        *self.occupied_mut(idx).1 = child;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, idx: NodeIndex, child: NodeIndex) {
        *self.occupied_mut(idx).2 = child;
    }

    #[inline]
    pub(crate) fn set_red(&mut self, idx: NodeIndex, is_red: bool) {
        *self.occupied_mut(idx).0 = is_red;
    }

    /// Toggles the color of a node; NIL is left alone.
    #[inline]
    pub(crate) fn toggle(&mut self, idx: NodeIndex) {
        if !idx.is_nil() {
            let red = self.occupied_mut(idx).0;
            *red = !*red;
        }
    }

    pub(crate) fn minimum(&self, mut idx: NodeIndex) -> NodeIndex {
        loop {
            let left = self.left(idx);
            if left.is_nil() {
                return idx;
            }
            idx = left;
        }
    }

    pub(crate) fn maximum(&self, mut idx: NodeIndex) -> NodeIndex {
        loop {
            let right = self.right(idx);
            if right.is_nil() {
                return idx;
            }
            idx = right;
        }
    }
}

/// Record storage plus bookkeeping, indexed by [`NodeIndex`].
#[derive(Clone, Debug)]
pub(crate) struct Arena<R> {
    records: Vec<Option<R>>,
    links: Links,
}

impl<R> Arena<R> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            links: Links::new(),
        }
    }

    #[inline]
    pub(crate) fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.links.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.links.capacity()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.links.first_free().is_nil()
    }

    /// Record stored in an occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is NIL, out of range, or free.
    #[inline]
    pub(crate) fn record(&self, idx: NodeIndex) -> &R {
        assert!(!idx.is_nil(), "NIL dereference");
        match self.records.get(idx.get()) {
            Some(Some(record)) => record,
            Some(None) => panic!("slot {idx} is free"),
            None => panic!("slot {idx} out of range (capacity {})", self.capacity()),
        }
    }

    /// Swaps the record in an occupied slot, returning the previous one.
    pub(crate) fn replace(&mut self, idx: NodeIndex, record: R) -> R {
        assert!(self.links.is_occupied(idx), "slot {idx} is not occupied");
        match self.records[idx.get()].replace(record) {
            Some(old) => old,
            None => panic!("slot {idx} has links but no record"),
        }
    }

    /// Extends both arrays to `new_capacity`. The new slots are chained in
    /// ascending order ahead of the existing free list.
    pub(crate) fn grow(&mut self, new_capacity: usize) {
        let old_capacity = self.capacity();
        assert!(new_capacity > old_capacity && new_capacity <= MAX_CAPACITY);

        self.records.resize_with(new_capacity, || None);
        self.links.slots.reserve_exact(new_capacity - old_capacity);
        for i in old_capacity..new_capacity {
            let next = if i + 1 < new_capacity {
                NodeIndex::new(i + 1)
            } else {
                self.links.first_free
            };
            self.links.slots.push(Slot::Free { next });
        }
        self.links.first_free = NodeIndex::new(old_capacity);
    }

    /// Pops the free-list head and stores `record` there as a red node with
    /// no children. Returns `Err(record)` when no slot is free.
    pub(crate) fn allocate(&mut self, record: R) -> Result<NodeIndex, R> {
        let idx = self.links.first_free;
        if idx.is_nil() {
            return Err(record);
        }

        let next = match self.links.slots[idx.get()] {
            Slot::Free { next } => next,
            Slot::Occupied { .. } => panic!("free list reached occupied slot {idx}"),
        };
        self.links.first_free = next;
        self.links.slots[idx.get()] = Slot::Occupied {
            red: true,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        };
        debug_assert!(self.records[idx.get()].is_none());
        self.records[idx.get()] = Some(record);
        self.links.len += 1;
        Ok(idx)
    }

    /// Takes the record out of `idx` and pushes the slot onto the free list.
    pub(crate) fn release(&mut self, idx: NodeIndex) -> R {
        assert!(self.links.is_occupied(idx), "slot {idx} is not occupied");
        let record = match self.records[idx.get()].take() {
            Some(record) => record,
            None => panic!("slot {idx} has links but no record"),
        };
        self.links.slots[idx.get()] = Slot::Free {
            next: self.links.first_free,
        };
        self.links.first_free = idx;
        self.links.len -= 1;
        record
    }
}

/// Read-only view of the tree shape, handed to eviction policies.
#[derive(Clone, Copy)]
pub struct Nodes<'a> {
    links: &'a Links,
    root: NodeIndex,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(links: &'a Links, root: NodeIndex) -> Self {
        Self { links, root }
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root.to_option()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.links.capacity()
    }

    pub fn is_occupied(&self, idx: NodeIndex) -> bool {
        self.links.is_occupied(idx)
    }

    /// # Panics
    ///
    /// Panics if `idx` is not occupied.
    pub fn left(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.links.left(idx).to_option()
    }

    /// # Panics
    ///
    /// Panics if `idx` is not occupied.
    pub fn right(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.links.right(idx).to_option()
    }

    pub fn is_red(&self, idx: NodeIndex) -> bool {
        self.links.is_red(idx)
    }

    /// Smallest-keyed node in the whole tree.
    pub fn minimum(&self) -> Option<NodeIndex> {
        self.root().map(|root| self.links.minimum(root))
    }

    /// Largest-keyed node in the whole tree.
    pub fn maximum(&self) -> Option<NodeIndex> {
        self.root().map(|root| self.links.maximum(root))
    }
}
