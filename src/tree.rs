//! The left-leaning red-black tree engine.
//!
//! Balancing follows Sedgewick's 2008 LLRB formulation: red links lean
//! left, inserts fix up on the way back out of the recursion, and deletes
//! push a red link ahead of the descent (`move_red_left`/`move_red_right`)
//! so that the node eventually removed is never a lone 2-node.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use crate::arena::{Arena, Links, Nodes, Slot};
use crate::error::{Error, Result};
use crate::index::MAX_CAPACITY;
use crate::iter::{Iter, Walk};
use crate::policy::{Grow, Policy};
use crate::schema::Schema;
use crate::NodeIndex;

// =============================================================================
// Balancing primitives (links only)
// =============================================================================

/// True if `idx` is a real node whose left child is red.
#[inline]
fn left_is_red(links: &Links, idx: NodeIndex) -> bool {
    !idx.is_nil() && links.is_red(links.left(idx))
}

fn rotate_left(links: &mut Links, h: NodeIndex) -> NodeIndex {
    let x = links.right(h);
    debug_assert!(links.is_red(x), "rotate_left on a black right link");
    links.set_right(h, links.left(x));
    links.set_left(x, h);
    links.set_red(x, links.is_red(h));
    links.set_red(h, true);
    x
}

fn rotate_right(links: &mut Links, h: NodeIndex) -> NodeIndex {
    let x = links.left(h);
    debug_assert!(links.is_red(x), "rotate_right on a black left link");
    links.set_left(h, links.right(x));
    links.set_right(x, h);
    links.set_red(x, links.is_red(h));
    links.set_red(h, true);
    x
}

fn flip_colors(links: &mut Links, h: NodeIndex) {
    links.toggle(h);
    links.toggle(links.left(h));
    links.toggle(links.right(h));
}

/// Restores the LLRB shape at `h` after a change below it.
fn fixup(links: &mut Links, mut h: NodeIndex) -> NodeIndex {
    if links.is_red(links.right(h)) && !links.is_red(links.left(h)) {
        h = rotate_left(links, h);
    }
    if links.is_red(links.left(h)) && left_is_red(links, links.left(h)) {
        h = rotate_right(links, h);
    }
    if links.is_red(links.left(h)) && links.is_red(links.right(h)) {
        flip_colors(links, h);
    }
    h
}

fn move_red_left(links: &mut Links, mut h: NodeIndex) -> NodeIndex {
    flip_colors(links, h);
    let right = links.right(h);
    if left_is_red(links, right) {
        let right = rotate_right(links, right);
        links.set_right(h, right);
        h = rotate_left(links, h);
        flip_colors(links, h);
    }
    h
}

fn move_red_right(links: &mut Links, mut h: NodeIndex) -> NodeIndex {
    flip_colors(links, h);
    if left_is_red(links, links.left(h)) {
        h = rotate_right(links, h);
        flip_colors(links, h);
    }
    h
}

// =============================================================================
// LlrbTree
// =============================================================================

/// An ordered map over arbitrary records, stored in an index-linked arena.
///
/// - Records live in slots addressed by [`NodeIndex`]; a record keeps its
///   slot for as long as it stays in the tree, including across growth.
/// - Without deletions, successive inserts of new keys get slots 0, 1, 2, …
/// - When the arena is full the [`Policy`] decides whether to grow or evict.
///
/// ```rust
/// use llrb_arena::{LlrbTree, Pairs};
///
/// let mut tree = LlrbTree::new(Pairs::new());
/// for k in [5, 3, 8] {
///     tree.insert((k, k * 10), true).unwrap();
/// }
/// let keys: Vec<i32> = tree.iter().map(|(_, (k, _))| *k).collect();
/// assert_eq!(keys, vec![3, 5, 8]);
/// assert_eq!(tree.lookup(&8), Some(&(8, 80)));
/// ```
pub struct LlrbTree<S: Schema, P: Policy = Grow> {
    pub(crate) schema: S,
    pub(crate) policy: P,
    pub(crate) arena: Arena<S::Record>,
    pub(crate) root: NodeIndex,
}

impl<S: Schema> LlrbTree<S, Grow> {
    /// Creates an empty tree with the default growth policy.
    pub fn new(schema: S) -> Self {
        Self::with_policy(schema, Grow::default())
    }
}

impl<S: Schema, P: Policy> LlrbTree<S, P> {
    /// Creates an empty tree. No slots are allocated until the first insert.
    pub fn with_policy(schema: S, policy: P) -> Self {
        Self {
            schema,
            policy,
            arena: Arena::new(),
            root: NodeIndex::NIL,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Number of allocated slots, occupied or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Bytes held by the two arena arrays.
    pub fn memory_usage(&self) -> usize {
        let slot = std::mem::size_of::<Option<S::Record>>() + std::mem::size_of::<Slot>();
        self.capacity() * slot
    }

    #[inline]
    pub fn root(&self) -> Option<NodeIndex> {
        self.root.to_option()
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Shared access only: stateful policies such as [`Lru`](crate::Lru)
    /// mirror the occupied slots through the hooks and cannot be swapped out.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Read-only view of the tree shape.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self.arena.links(), self.root)
    }

    #[inline]
    fn key_at(&self, idx: NodeIndex) -> &S::Key {
        self.schema.key(self.arena.record(idx))
    }

    /// Orders the node at `target` relative to the node at `node`.
    #[inline]
    fn order(&self, target: NodeIndex, node: NodeIndex) -> Ordering {
        if target == node {
            return Ordering::Equal;
        }
        self.schema.compare(self.key_at(target), self.key_at(node))
    }

    /// Slot holding `key`, if present.
    pub fn find(&self, key: &S::Key) -> Option<NodeIndex> {
        let links = self.arena.links();
        let mut current = self.root;
        while !current.is_nil() {
            current = match self.schema.compare(key, self.key_at(current)) {
                Ordering::Less => links.left(current),
                Ordering::Greater => links.right(current),
                Ordering::Equal => return Some(current),
            };
        }
        None
    }

    /// Record stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is NIL, out of range, or a free slot.
    #[inline]
    pub fn get(&self, index: NodeIndex) -> &S::Record {
        self.arena.record(index)
    }

    /// Record stored under `key`, if present.
    pub fn lookup(&self, key: &S::Key) -> Option<&S::Record> {
        self.find(key).map(|idx| self.arena.record(idx))
    }

    pub fn contains_key(&self, key: &S::Key) -> bool {
        self.find(key).is_some()
    }

    pub fn left(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.arena.links().left(index).to_option()
    }

    pub fn right(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.arena.links().right(index).to_option()
    }

    /// Smallest node under `subtree`, or under the root when `subtree` is `None`.
    pub fn minimum(&self, subtree: Option<NodeIndex>) -> Option<NodeIndex> {
        let start = subtree.unwrap_or(self.root);
        start.to_option().map(|idx| self.arena.links().minimum(idx))
    }

    /// Largest node under `subtree`, or under the root when `subtree` is `None`.
    pub fn maximum(&self, subtree: Option<NodeIndex>) -> Option<NodeIndex> {
        let start = subtree.unwrap_or(self.root);
        start.to_option().map(|idx| self.arena.links().maximum(idx))
    }

    /// Reports a use of `index` to the policy (e.g. to refresh LRU order).
    ///
    /// # Panics
    ///
    /// Panics if `index` is not occupied.
    pub fn touch(&mut self, index: NodeIndex) {
        assert!(self.arena.links().is_occupied(index), "slot {index} is not occupied");
        self.policy.on_access(index);
    }

    /// Inserts `record`, returning the slot that holds its key.
    ///
    /// If the key is already present the existing slot is returned; with
    /// `replace` the stored record is swapped for `record` and the old one
    /// goes through [`Schema::dispose`], otherwise `record` is dropped and
    /// the stored one is left alone. Policy hooks only fire for new keys.
    ///
    /// A new key may grow the arena or evict another node first, depending
    /// on the policy. If neither is possible the tree is left untouched and
    /// [`Error::Exhausted`] is returned.
    pub fn insert(&mut self, record: S::Record, replace: bool) -> Result<NodeIndex> {
        // A full arena must not grow or evict for a key that is already here.
        if self.arena.is_full() {
            if let Some(idx) = self.find(self.schema.key(&record)) {
                self.overwrite(idx, record, replace);
                return Ok(idx);
            }
            self.reserve_slot()?;
        }

        let new = match self.arena.allocate(record) {
            Ok(idx) => idx,
            Err(_) => {
                let capacity = self.capacity();
                return Err(self.fail(Error::Exhausted { capacity }));
            }
        };

        let mut existing = None;
        self.root = self.insert_at(self.root, new, &mut existing);
        self.arena.links_mut().set_red(self.root, false);

        match existing {
            Some(idx) => {
                // Never linked; the slot goes straight back to the free-list head.
                let record = self.arena.release(new);
                self.overwrite(idx, record, replace);
                Ok(idx)
            }
            None => {
                self.policy.on_insert(new);
                Ok(new)
            }
        }
    }

    fn overwrite(&mut self, idx: NodeIndex, record: S::Record, replace: bool) {
        if replace {
            let old = self.arena.replace(idx, record);
            self.schema.dispose(old);
        }
    }

    /// Makes sure the free list is non-empty, asking the policy to grow or
    /// evict if it is.
    fn reserve_slot(&mut self) -> Result<()> {
        if !self.arena.is_full() {
            return Ok(());
        }

        let capacity = self.arena.capacity();
        if let Some(requested) = self.policy.resize(capacity) {
            let new_capacity = requested.min(MAX_CAPACITY);
            if new_capacity > capacity {
                tracing::debug!(from = capacity, to = new_capacity, "growing arena");
                self.arena.grow(new_capacity);
                return Ok(());
            }
        }

        let victim = self
            .policy
            .select(Nodes::new(self.arena.links(), self.root));
        match victim {
            Some(victim) if self.arena.links().is_occupied(victim) => {
                tracing::debug!(%victim, len = self.len(), "evicting node");
                self.remove_node(victim);
                Ok(())
            }
            Some(victim) => Err(self.fail(Error::InvalidVictim { index: victim })),
            None => Err(self.fail(Error::Exhausted { capacity })),
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.policy.abort(&error);
        error
    }

    /// Links the detached node `new` into the subtree rooted at `h`. If a
    /// node with the same key is met on the way down, `new` stays detached
    /// and that node is reported through `existing`.
    fn insert_at(
        &mut self,
        h: NodeIndex,
        new: NodeIndex,
        existing: &mut Option<NodeIndex>,
    ) -> NodeIndex {
        if h.is_nil() {
            return new;
        }

        match self.order(new, h) {
            Ordering::Less => {
                let left = self.arena.links().left(h);
                let left = self.insert_at(left, new, existing);
                self.arena.links_mut().set_left(h, left);
            }
            Ordering::Greater => {
                let right = self.arena.links().right(h);
                let right = self.insert_at(right, new, existing);
                self.arena.links_mut().set_right(h, right);
            }
            Ordering::Equal => {
                *existing = Some(h);
                return h;
            }
        }

        fixup(self.arena.links_mut(), h)
    }

    /// Removes the node holding `key`. Returns `false` if the key is absent.
    pub fn delete(&mut self, key: &S::Key) -> bool {
        match self.find(key) {
            Some(idx) => {
                self.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Removes the smallest node under `subtree` (the whole tree for `None`).
    /// Returns `false` if there was nothing to remove.
    ///
    /// # Panics
    ///
    /// Panics if `subtree` names a slot that is not occupied.
    pub fn delete_min(&mut self, subtree: Option<NodeIndex>) -> bool {
        if self.root.is_nil() {
            return false;
        }

        match subtree {
            Some(sub) if sub != self.root => {
                let min = self.arena.links().minimum(sub);
                self.remove_node(min);
            }
            _ => {
                self.redden_root();
                self.root = self.delete_min_at(self.root, true);
                self.blacken_root();
            }
        }
        true
    }

    /// Deletes an occupied node from the tree and frees its slot.
    fn remove_node(&mut self, target: NodeIndex) {
        debug_assert!(self.arena.links().is_occupied(target));
        self.redden_root();
        self.root = self.delete_at(self.root, target);
        self.blacken_root();
    }

    fn redden_root(&mut self) {
        let links = self.arena.links_mut();
        if !links.is_red(links.left(self.root)) && !links.is_red(links.right(self.root)) {
            links.set_red(self.root, true);
        }
    }

    fn blacken_root(&mut self) {
        if !self.root.is_nil() {
            self.arena.links_mut().set_red(self.root, false);
        }
    }

    /// Removes the minimum of the subtree at `h`, freeing its slot when
    /// `free` is set (otherwise the node is only unlinked).
    fn delete_min_at(&mut self, mut h: NodeIndex, free: bool) -> NodeIndex {
        let links = self.arena.links_mut();
        if links.left(h).is_nil() {
            if free {
                self.free_node(h);
            }
            return NodeIndex::NIL;
        }

        if !links.is_red(links.left(h)) && !left_is_red(links, links.left(h)) {
            h = move_red_left(links, h);
        }

        let left = self.delete_min_at(self.arena.links().left(h), free);
        let links = self.arena.links_mut();
        links.set_left(h, left);
        fixup(links, h)
    }

    /// Removes `target` from the subtree at `h`. `target` must be in it.
    fn delete_at(&mut self, mut h: NodeIndex, target: NodeIndex) -> NodeIndex {
        if self.order(target, h) == Ordering::Less {
            let links = self.arena.links_mut();
            if !links.is_red(links.left(h)) && !left_is_red(links, links.left(h)) {
                h = move_red_left(links, h);
            }
            let left = self.delete_at(self.arena.links().left(h), target);
            self.arena.links_mut().set_left(h, left);
        } else {
            let links = self.arena.links_mut();
            if links.is_red(links.left(h)) {
                h = rotate_right(links, h);
            }
            if h == target && links.right(h).is_nil() {
                self.free_node(h);
                return NodeIndex::NIL;
            }
            if !links.is_red(links.right(h)) && !left_is_red(links, links.right(h)) {
                h = move_red_right(links, h);
            }

            if h == target {
                // Splice the in-order successor into h's position.
                let right = links.right(h);
                let successor = links.minimum(right);
                let right = self.delete_min_at(right, false);

                let links = self.arena.links_mut();
                let (red, left) = (links.is_red(h), links.left(h));
                links.set_left(successor, left);
                links.set_right(successor, right);
                links.set_red(successor, red);
                self.free_node(h);
                h = successor;
            } else {
                let right = links.right(h);
                let right = self.delete_at(right, target);
                self.arena.links_mut().set_right(h, right);
            }
        }

        fixup(self.arena.links_mut(), h)
    }

    /// Frees a slot whose node is no longer linked.
    fn free_node(&mut self, idx: NodeIndex) {
        self.policy.on_remove(idx);
        let record = self.arena.release(idx);
        self.schema.dispose(record);
    }

    /// Removes every node. Capacity is kept.
    pub fn clear(&mut self) {
        let mut walk = Walk::new(self.arena.links(), self.root);
        while let Some(idx) = walk.next(self.arena.links()) {
            self.free_node(idx);
        }
        self.root = NodeIndex::NIL;
        debug_assert_eq!(self.len(), 0);
    }

    /// Calls `visit` on every node in ascending key order.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(NodeIndex, &S::Record),
    {
        for (idx, record) in self.iter() {
            visit(idx, record);
        }
    }

    pub fn iter(&self) -> Iter<'_, S::Record> {
        Iter::new(&self.arena, self.root)
    }

    /// Disposes of every record (firing the remove hook for each), then
    /// releases the arena. Equivalent to dropping the tree.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<S: Schema, P: Policy> Drop for LlrbTree<S, P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: Schema, P: Policy> Index<NodeIndex> for LlrbTree<S, P> {
    type Output = S::Record;

    fn index(&self, index: NodeIndex) -> &S::Record {
        self.get(index)
    }
}

impl<'a, S: Schema, P: Policy> IntoIterator for &'a LlrbTree<S, P> {
    type Item = (NodeIndex, &'a S::Record);
    type IntoIter = Iter<'a, S::Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S, P> Clone for LlrbTree<S, P>
where
    S: Schema + Clone,
    P: Policy + Clone,
    S::Record: Clone,
{
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            policy: self.policy.clone(),
            arena: self.arena.clone(),
            root: self.root,
        }
    }
}

impl<S, P> fmt::Debug for LlrbTree<S, P>
where
    S: Schema,
    P: Policy,
    S::Record: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
