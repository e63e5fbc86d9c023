//! Cache Entry Module
//!
//! Defines the node stored in the LRU list arena.

// == Node Handle ==
/// Stable handle to a node slot inside a [`LinkedList`](super::LinkedList).
///
/// Handles are only meaningful for the list that issued them and become
/// stale once the node is popped or the list is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

// == Cache Entry ==
/// A single list node: the cached value, the key it was stored under, and
/// its neighbor links.
///
/// Links are handles into the arena rather than pointers, so there is no
/// owning cycle between `prev` and `next`.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// Key used to remove the matching map entry on eviction
    pub key: K,
    /// The stored value
    pub value: V,
    /// Neighbor closer to the head (more recently used)
    pub(crate) prev: Option<NodeId>,
    /// Neighbor closer to the tail (less recently used)
    pub(crate) next: Option<NodeId>,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates a detached node.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    /// Returns true if the node has no neighbors.
    pub fn is_detached(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}
