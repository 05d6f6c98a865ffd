//! Capacity policies: what a tree does when its arena has no free slot.
//!
//! When an insert needs a slot and none is free, the tree first asks
//! [`Policy::resize`] for a larger capacity. If that yields nothing it asks
//! [`Policy::select`] for a victim, which is deleted to make room. If both
//! decline, [`Policy::abort`] is notified and the insert fails with
//! [`Error::Exhausted`].
//!
//! The hooks run synchronously inside the tree call and must not re-enter
//! the tree.

use crate::arena::Nodes;
use crate::config::GrowthConfig;
use crate::error::Error;
use crate::NodeIndex;

/// Growth, eviction, and notification callbacks consulted by a tree.
pub trait Policy {
    /// Requested capacity given the current one. Returning `None` (or a value
    /// not larger than `capacity`) means "do not grow".
    fn resize(&mut self, capacity: usize) -> Option<usize> {
        let _ = capacity;
        None
    }

    /// Picks an occupied node to evict. `None` means eviction is unavailable.
    fn select(&mut self, nodes: Nodes<'_>) -> Option<NodeIndex> {
        let _ = nodes;
        None
    }

    /// A node was newly linked into the tree.
    fn on_insert(&mut self, index: NodeIndex) {
        let _ = index;
    }

    /// A node is about to have its slot freed.
    fn on_remove(&mut self, index: NodeIndex) {
        let _ = index;
    }

    /// The caller touched a node through the tree.
    fn on_access(&mut self, index: NodeIndex) {
        let _ = index;
    }

    /// An operation failed irrecoverably; called right before the error is returned.
    fn abort(&mut self, error: &Error) {
        tracing::error!(%error, "llrb arena operation aborted");
    }
}

// =============================================================================
// Grow
// =============================================================================

/// Default policy: grow per [`GrowthConfig`] (64 slots, then x1.5), never evict.
#[derive(Debug, Clone, Default)]
pub struct Grow {
    config: GrowthConfig,
}

impl Grow {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }
}

impl Policy for Grow {
    fn resize(&mut self, capacity: usize) -> Option<usize> {
        self.config.next_capacity(capacity)
    }
}

// =============================================================================
// Fixed
// =============================================================================

/// Allocates `capacity` slots on first use and never grows or evicts.
#[derive(Debug, Clone)]
pub struct Fixed {
    capacity: usize,
}

impl Fixed {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Policy for Fixed {
    fn resize(&mut self, capacity: usize) -> Option<usize> {
        (capacity < self.capacity).then_some(self.capacity)
    }
}

// =============================================================================
// Recency list (intrusive, indexed by slot)
// =============================================================================

/// Doubly-linked recency order over slot indices. Head is most recent.
#[derive(Debug, Clone)]
struct Recency {
    /// `(prev, next)` per slot; NIL on both sides for slots not in the list.
    links: Vec<(NodeIndex, NodeIndex)>,
    head: NodeIndex,
    tail: NodeIndex,
    len: usize,
}

impl Recency {
    fn new() -> Self {
        Self {
            links: Vec::new(),
            head: NodeIndex::NIL,
            tail: NodeIndex::NIL,
            len: 0,
        }
    }

    fn push_front(&mut self, idx: NodeIndex) {
        if self.links.len() <= idx.get() {
            self.links.resize(idx.get() + 1, (NodeIndex::NIL, NodeIndex::NIL));
        }
        self.links[idx.get()] = (NodeIndex::NIL, self.head);
        if self.head.is_nil() {
            self.tail = idx;
        } else {
            self.links[self.head.get()].0 = idx;
        }
        self.head = idx;
        self.len += 1;
    }

    fn unlink(&mut self, idx: NodeIndex) {
        let (prev, next) = self.links[idx.get()];
        if prev.is_nil() {
            debug_assert_eq!(self.head, idx);
            self.head = next;
        } else {
            self.links[prev.get()].1 = next;
        }
        if next.is_nil() {
            debug_assert_eq!(self.tail, idx);
            self.tail = prev;
        } else {
            self.links[next.get()].0 = prev;
        }
        self.links[idx.get()] = (NodeIndex::NIL, NodeIndex::NIL);
        self.len -= 1;
    }

    fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let idx = cur.to_option()?;
            cur = self.links[idx.get()].1;
            Some(idx)
        })
    }
}

// =============================================================================
// Lru
// =============================================================================

/// Bounded cache policy: grows up to `max_capacity`, then evicts the least
/// recently inserted or touched node.
#[derive(Debug, Clone)]
pub struct Lru {
    config: GrowthConfig,
    order: Recency,
}

impl Lru {
    pub fn new(config: GrowthConfig) -> Self {
        Self {
            config,
            order: Recency::new(),
        }
    }

    /// An LRU that allocates `capacity` slots up front and never grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(GrowthConfig::bounded(capacity))
    }

    /// Slots from most to least recently used.
    pub fn recency(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.order.iter()
    }

    pub fn least_recent(&self) -> Option<NodeIndex> {
        self.order.tail.to_option()
    }

    pub fn len(&self) -> usize {
        self.order.len
    }

    pub fn is_empty(&self) -> bool {
        self.order.len == 0
    }
}

impl Policy for Lru {
    fn resize(&mut self, capacity: usize) -> Option<usize> {
        self.config.next_capacity(capacity)
    }

    fn select(&mut self, _nodes: Nodes<'_>) -> Option<NodeIndex> {
        self.least_recent()
    }

    fn on_insert(&mut self, index: NodeIndex) {
        self.order.push_front(index);
    }

    fn on_remove(&mut self, index: NodeIndex) {
        self.order.unlink(index);
    }

    fn on_access(&mut self, index: NodeIndex) {
        self.order.unlink(index);
        self.order.push_front(index);
    }
}

// =============================================================================
// EvictMin
// =============================================================================

/// Grows up to `max_capacity`, then evicts the smallest key, so the tree
/// retains the largest keys seen.
#[derive(Debug, Clone)]
pub struct EvictMin {
    config: GrowthConfig,
}

impl EvictMin {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(GrowthConfig::bounded(capacity))
    }
}

impl Policy for EvictMin {
    fn resize(&mut self, capacity: usize) -> Option<usize> {
        self.config.next_capacity(capacity)
    }

    fn select(&mut self, nodes: Nodes<'_>) -> Option<NodeIndex> {
        nodes.minimum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn test_fixed_allocates_once() {
        let mut p = Fixed::new(8);
        assert_eq!(p.resize(0), Some(8));
        assert_eq!(p.resize(8), None);
    }

    #[test]
    fn test_grow_follows_config() {
        let mut p = Grow::default();
        assert_eq!(p.resize(0), Some(64));
        assert_eq!(p.resize(64), Some(96));

        let mut capped = Grow::new(GrowthConfig::default().with_max_capacity(64));
        assert_eq!(capped.resize(64), None);
    }

    #[test]
    fn test_recency_order() {
        let mut p = Lru::with_capacity(4);
        for i in 0..4 {
            p.on_insert(idx(i));
        }
        assert_eq!(p.recency().map(NodeIndex::get).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!(p.least_recent(), Some(idx(0)));

        p.on_access(idx(0));
        assert_eq!(p.recency().map(NodeIndex::get).collect::<Vec<_>>(), vec![0, 3, 2, 1]);
        assert_eq!(p.least_recent(), Some(idx(1)));

        p.on_remove(idx(2));
        p.on_remove(idx(1));
        assert_eq!(p.recency().map(NodeIndex::get).collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(p.len(), 2);

        p.on_remove(idx(0));
        p.on_remove(idx(3));
        assert!(p.is_empty());
        assert_eq!(p.least_recent(), None);
    }

    #[test]
    fn test_default_hooks_decline() {
        struct Nothing;
        impl Policy for Nothing {}

        let mut p = Nothing;
        assert_eq!(p.resize(0), None);
        p.on_insert(idx(0));
        p.on_remove(idx(0));
        p.abort(&Error::Exhausted { capacity: 0 });
    }
}
