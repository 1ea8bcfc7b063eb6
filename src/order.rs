//! Move-to-front ordered map.
//!
//! Entries live in a slab and are threaded on a doubly linked list whose
//! head is the most recently touched key. A name index maps each key to
//! its slab slot, so lookup and move-to-front are both O(1) and iteration
//! order is stable between touches.
//!
//! Entries are never removed individually; [`RecencyList::clear`] drops
//! everything at once.

use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Keyed collection ordered most-recently-touched first.
#[derive(Debug, Clone)]
pub struct RecencyList<V> {
    nodes: Vec<Node<V>>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new(), index: HashMap::new(), head: None, tail: None }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the list holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Value for `key`, without changing the order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.nodes[slot].value)
    }

    /// Mutable value for `key`, without changing the order.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let slot = *self.index.get(key)?;
        Some(&mut self.nodes[slot].value)
    }

    /// Moves `key` to the front, inserting `make()` first if it is absent.
    pub fn touch_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let slot = if let Some(&slot) = self.index.get(key) {
            if self.head != Some(slot) {
                self.unlink(slot);
                self.link_front(slot);
            }
            slot
        } else {
            let slot = self.nodes.len();
            self.nodes.push(Node { key: key.to_string(), value: make(), prev: None, next: None });
            self.index.insert(key.to_string(), slot);
            self.link_front(slot);
            slot
        };
        &mut self.nodes[slot].value
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Front-to-back iterator over `(key, value)`.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { list: self, cursor: self.head }
    }

    /// Visits every entry front to back with mutable access, stopping at
    /// the first error.
    pub fn try_for_each_mut<E>(
        &mut self,
        mut f: impl FnMut(&str, &mut V) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = &mut self.nodes[slot];
            cursor = node.next;
            f(&node.key, &mut node.value)?;
        }
        Ok(())
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    fn link_front(&mut self, slot: usize) {
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}

/// Iterator returned by [`RecencyList::iter`].
#[derive(Debug)]
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    cursor: Option<usize>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = &list.nodes[self.cursor?];
        self.cursor = node.next;
        Some((node.key.as_str(), &node.value))
    }
}
