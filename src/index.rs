//! Slot indices into the node arena.

use std::fmt;

/// Largest number of slots an arena may hold.
///
/// Kept one below [`NodeIndex::NIL`] so that no real slot can collide with
/// the sentinel.
pub const MAX_CAPACITY: usize = (u32::MAX - 1) as usize;

/// Index of a node slot in the arena.
///
/// Indices stay valid across arena growth (both arrays keep their slot
/// numbering), but a slot is reused once its node is deleted or evicted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Sentinel meaning "no node". Only ever stored in link fields.
    pub const NIL: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub(crate) fn new(slot: usize) -> Self {
        debug_assert!(slot <= MAX_CAPACITY);
        Self(slot as u32)
    }

    /// Slot number of this index.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }

    /// `None` for [`NodeIndex::NIL`], `Some(self)` otherwise.
    #[inline]
    pub fn to_option(self) -> Option<NodeIndex> {
        (!self.is_nil()).then_some(self)
    }
}

impl From<NodeIndex> for usize {
    fn from(index: NodeIndex) -> usize {
        index.get()
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NodeIndex(NIL)")
        } else {
            write!(f, "NodeIndex({})", self.0)
        }
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NIL")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_is_not_a_slot() {
        assert!(NodeIndex::NIL.is_nil());
        assert!(NodeIndex::NIL.get() > MAX_CAPACITY);
        assert_eq!(NodeIndex::NIL.to_option(), None);
        assert!(!NodeIndex::new(MAX_CAPACITY).is_nil());
    }

    #[test]
    fn test_option_round_trip() {
        let idx = NodeIndex::new(7);
        assert_eq!(idx.to_option(), Some(idx));
        assert_eq!(usize::from(idx), 7);
        assert_eq!(format!("{idx} {}", NodeIndex::NIL), "7 NIL");
    }
}
