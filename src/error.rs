//! Error types for tree operations.

use thiserror::Error;

use crate::NodeIndex;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable failures surfaced by the tree.
///
/// Structural misuse (dereferencing NIL or a free slot) is a programmer
/// error and panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The arena is full and the policy could neither grow it nor pick a
    /// node to evict.
    #[error("arena exhausted at capacity {capacity}: no growth and no eviction available")]
    Exhausted { capacity: usize },

    /// The eviction policy returned a slot that holds no node.
    #[error("eviction policy selected slot {index}, which is not occupied")]
    InvalidVictim { index: NodeIndex },
}
