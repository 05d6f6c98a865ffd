//! In-order traversal with a fixed-size stack.

use std::iter::FusedIterator;

use crate::arena::{Arena, Links};
use crate::NodeIndex;

/// Deepest path a traversal can hold. An LLRB of `n` nodes has height at
/// most `2 * log2(n + 1)`, and `n` fits in 32 bits.
pub(crate) const MAX_DEPTH: usize = 2 * u32::BITS as usize;

/// Detached in-order cursor.
///
/// Holds no borrow of the tree between steps, so the caller may free the
/// node it was just handed: its right subtree has already been pushed.
#[derive(Clone)]
pub(crate) struct Walk {
    stack: [NodeIndex; MAX_DEPTH],
    len: usize,
}

impl Walk {
    pub(crate) fn new(links: &Links, root: NodeIndex) -> Self {
        let mut walk = Self {
            stack: [NodeIndex::NIL; MAX_DEPTH],
            len: 0,
        };
        walk.descend_left(links, root);
        walk
    }

    fn descend_left(&mut self, links: &Links, mut idx: NodeIndex) {
        while !idx.is_nil() {
            assert!(self.len < MAX_DEPTH, "tree deeper than {MAX_DEPTH} levels");
            self.stack[self.len] = idx;
            self.len += 1;
            idx = links.left(idx);
        }
    }

    pub(crate) fn next(&mut self, links: &Links) -> Option<NodeIndex> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let idx = self.stack[self.len];
        self.descend_left(links, links.right(idx));
        Some(idx)
    }
}

/// Iterator over `(index, record)` pairs in ascending key order.
///
/// Created by [`LlrbTree::iter`](crate::LlrbTree::iter).
pub struct Iter<'a, R> {
    arena: &'a Arena<R>,
    walk: Walk,
    remaining: usize,
}

impl<'a, R> Iter<'a, R> {
    pub(crate) fn new(arena: &'a Arena<R>, root: NodeIndex) -> Self {
        Self {
            arena,
            walk: Walk::new(arena.links(), root),
            remaining: arena.len(),
        }
    }
}

impl<'a, R> Iterator for Iter<'a, R> {
    type Item = (NodeIndex, &'a R);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.walk.next(self.arena.links())?;
        self.remaining -= 1;
        Some((idx, self.arena.record(idx)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R> ExactSizeIterator for Iter<'_, R> {}

impl<R> FusedIterator for Iter<'_, R> {}

impl<R> Clone for Iter<'_, R> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            walk: self.walk.clone(),
            remaining: self.remaining,
        }
    }
}
