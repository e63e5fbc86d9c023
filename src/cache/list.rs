//! Linked List Module
//!
//! Doubly linked list over a slot arena, used to keep LRU order.
//!
//! - Head = Most recently used
//! - Tail = Least recently used (next eviction candidate)

use super::entry::{CacheEntry, NodeId};

// == Linked List ==
/// Arena-backed doubly linked list with O(1) append, move-to-front and pop.
///
/// Nodes live in `slots` and refer to each other by [`NodeId`]. Freed slots
/// are recycled through `free`, so `move_to_front` never allocates.
#[derive(Debug)]
pub struct LinkedList<K, V> {
    slots: Vec<Option<CacheEntry<K, V>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K, V> Default for LinkedList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LinkedList<K, V> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Append ==
    /// Inserts a new node at the head and returns its handle.
    ///
    /// On an empty list the node becomes both head and tail.
    pub fn append(&mut self, key: K, value: V) -> NodeId {
        let entry = CacheEntry::new(key, value);
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(entry);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(entry));
                NodeId(self.slots.len() - 1)
            }
        };
        self.link_front(id);
        self.len += 1;
        id
    }

    // == Move To Front ==
    /// Unlinks the node from its position and re-links it at the head.
    ///
    /// Stale handles are ignored.
    pub fn move_to_front(&mut self, id: NodeId) {
        if self.node(id).is_none() || self.head == Some(id) {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    // == Pop ==
    /// Removes and returns the tail node, or None if the list is empty.
    pub fn pop(&mut self) -> Option<CacheEntry<K, V>> {
        let id = self.tail?;
        self.unlink(id);
        let entry = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    // == Remove All ==
    /// Drops every node and resets head and tail.
    pub fn remove_all(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Accessors ==
    /// Returns the node behind a handle, if it is still live.
    pub fn get(&self, id: NodeId) -> Option<&CacheEntry<K, V>> {
        self.node(id)
    }

    /// Handle of the most recently used node.
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Handle of the least recently used node.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates keys from head (most recent) to tail (least recent).
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(&node.key)
        })
    }

    // == Internal Helpers ==
    fn node(&self, id: NodeId) -> Option<&CacheEntry<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Links a detached node in front of the current head.
    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.node_mut(head) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Detaches a node, repairing its neighbors and the endpoints.
    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = match self.node_mut(id) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };
        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(list: &LinkedList<&'static str, u32>) -> Vec<&'static str> {
        list.keys().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: LinkedList<u64, u32> = LinkedList::new();
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn test_append_single_is_head_and_tail() {
        let mut list = LinkedList::new();
        let id = list.append("a", 1);

        assert_eq!(list.head(), Some(id));
        assert_eq!(list.tail(), Some(id));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_append_inserts_at_head() {
        let mut list = LinkedList::new();
        list.append("a", 1);
        list.append("b", 2);
        list.append("c", 3);

        assert_eq!(keys_of(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_pop_returns_tail() {
        let mut list = LinkedList::new();
        list.append("a", 1);
        list.append("b", 2);

        let popped = list.pop().unwrap();
        assert_eq!(popped.key, "a");
        assert_eq!(popped.value, 1);
        assert!(popped.is_detached());
        assert_eq!(keys_of(&list), vec!["b"]);
    }

    #[test]
    fn test_pop_empty() {
        let mut list: LinkedList<u64, u32> = LinkedList::new();
        assert!(list.pop().is_none());
    }

    #[test]
    fn test_move_to_front_then_pop_single_node() {
        let mut list = LinkedList::new();
        let id = list.append("only", 1);

        list.move_to_front(id);
        let popped = list.pop().unwrap();

        assert_eq!(popped.key, "only");
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn test_move_tail_to_front() {
        let mut list = LinkedList::new();
        let a = list.append("a", 1);
        list.append("b", 2);
        list.append("c", 3);

        list.move_to_front(a);

        assert_eq!(keys_of(&list), vec!["a", "c", "b"]);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.get(list.tail().unwrap()).unwrap().key, "b");
    }

    #[test]
    fn test_move_middle_to_front() {
        let mut list = LinkedList::new();
        list.append("a", 1);
        let b = list.append("b", 2);
        list.append("c", 3);

        list.move_to_front(b);

        assert_eq!(keys_of(&list), vec!["b", "c", "a"]);
        assert_eq!(list.pop().unwrap().key, "a");
        assert_eq!(list.pop().unwrap().key, "c");
        assert_eq!(list.pop().unwrap().key, "b");
        assert!(list.pop().is_none());
    }

    #[test]
    fn test_move_head_to_front_is_noop() {
        let mut list = LinkedList::new();
        list.append("a", 1);
        let b = list.append("b", 2);

        list.move_to_front(b);

        assert_eq!(keys_of(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut list = LinkedList::new();
        let a = list.append("a", 1);
        list.append("b", 2);
        list.pop();

        list.move_to_front(a);

        assert_eq!(keys_of(&list), vec!["b"]);
        assert!(list.get(a).is_none());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = LinkedList::new();
        let a = list.append("a", 1);
        list.pop();
        let b = list.append("b", 2);

        assert_eq!(a, b);
        assert_eq!(list.get(b).unwrap().value, 2);
    }

    #[test]
    fn test_remove_all() {
        let mut list = LinkedList::new();
        list.append("a", 1);
        list.append("b", 2);

        list.remove_all();

        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        assert!(list.pop().is_none());

        list.append("c", 3);
        assert_eq!(keys_of(&list), vec!["c"]);
    }
}
