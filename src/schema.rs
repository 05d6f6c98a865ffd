//! Record schemas: how the tree finds, orders, and disposes of a record's key.

use std::cmp::Ordering;
use std::marker::PhantomData;

/// Describes the records stored in a tree.
///
/// The tree never looks inside a record beyond [`Schema::key`]; everything
/// else about the record belongs to the caller.
pub trait Schema {
    /// Stored payload type.
    type Record;
    /// Key projected out of each record.
    type Key: ?Sized;

    /// Borrows the key field of `record`.
    fn key<'a>(&self, record: &'a Self::Record) -> &'a Self::Key;

    /// Total order over keys. Keys comparing `Equal` are the same key.
    fn compare(&self, lhs: &Self::Key, rhs: &Self::Key) -> Ordering;

    /// Called with every record leaving the tree: deletion, eviction,
    /// clearing, and the old value of a replacing insert.
    fn dispose(&mut self, record: Self::Record) {
        drop(record);
    }
}

/// Schema built from a key-projection closure over `Ord` keys.
///
/// ```rust
/// use llrb_arena::{KeyFn, LlrbTree};
///
/// struct Session {
///     id: u64,
///     user: String,
/// }
///
/// let mut tree = LlrbTree::new(KeyFn::new(|s: &Session| &s.id));
/// tree.insert(Session { id: 7, user: "ada".into() }, true).unwrap();
/// assert_eq!(tree.lookup(&7).map(|s| s.user.as_str()), Some("ada"));
/// ```
pub struct KeyFn<R, K: ?Sized, F> {
    project: F,
    _marker: PhantomData<fn(&R) -> &K>,
}

impl<R, K: ?Sized, F> KeyFn<R, K, F>
where
    F: Fn(&R) -> &K,
{
    pub fn new(project: F) -> Self {
        Self {
            project,
            _marker: PhantomData,
        }
    }
}

impl<R, K, F> Schema for KeyFn<R, K, F>
where
    K: Ord + ?Sized,
    F: Fn(&R) -> &K,
{
    type Record = R;
    type Key = K;

    #[inline]
    fn key<'a>(&self, record: &'a R) -> &'a K {
        (self.project)(record)
    }

    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Schema for `(key, value)` tuples ordered by the key.
pub struct Pairs<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Pairs<K, V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Clone for Pairs<K, V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K, V> Default for Pairs<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Schema for Pairs<K, V> {
    type Record = (K, V);
    type Key = K;

    #[inline]
    fn key<'a>(&self, record: &'a (K, V)) -> &'a K {
        &record.0
    }

    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}
