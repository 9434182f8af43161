//! Child map type for VDF map nodes.
//!
//! This module provides [`VdfMap`], a wrapper around [`IndexMap`] holding the
//! children of a map [`Node`](crate::Node).
//!
//! ## Ordering
//!
//! VDF documents make no promise about key order. `VdfMap` remembers insertion
//! order so that iteration over a freshly parsed tree follows the source text,
//! but equality ignores order and the encoder always writes keys sorted
//! lexicographically.
//!
//! ## Examples
//!
//! ```rust
//! use serde_vdf::{Node, VdfMap};
//!
//! let mut map = VdfMap::new();
//! map.insert("name".to_string(), Node::scalar("Alice"));
//! map.insert("team".to_string(), Node::scalar("red"));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|n| n.as_str()), Some("Alice"));
//! ```

use crate::Node;
use indexmap::IndexMap;
use std::collections::HashMap;

/// A map of string keys to child nodes.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::{Node, VdfMap};
///
/// let mut map = VdfMap::new();
/// map.insert("b".to_string(), Node::scalar("2"));
/// map.insert("a".to_string(), Node::scalar("1"));
///
/// // Iteration follows insertion order
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["b", "a"]);
///
/// // Sorted order is what the encoder uses
/// let sorted: Vec<_> = map.sorted_keys().into_iter().cloned().collect();
/// assert_eq!(sorted, vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VdfMap(IndexMap<String, Node>);

impl VdfMap {
    /// Creates an empty `VdfMap`.
    #[must_use]
    pub fn new() -> Self {
        VdfMap(IndexMap::new())
    }

    /// Creates an empty `VdfMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        VdfMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a child under `key`.
    ///
    /// If the map already held a child under this key it is replaced in place
    /// and returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::{Node, VdfMap};
    ///
    /// let mut map = VdfMap::new();
    /// assert!(map.insert("key".to_string(), Node::scalar("1")).is_none());
    /// assert!(map.insert("key".to_string(), Node::scalar("2")).is_some());
    /// ```
    pub fn insert(&mut self, key: String, node: Node) -> Option<Node> {
        self.0.insert(key, node)
    }

    /// Returns a reference to the child under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the child under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.0.get_mut(key)
    }

    /// Removes the child under `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.shift_remove(key)
    }

    /// Returns `true` if the map holds a child under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Node> {
        self.0.keys()
    }

    /// Returns an iterator over the children, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
        self.0.values()
    }

    /// Returns an iterator over the key-child pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.0.iter()
    }

    /// Returns a mutable iterator over the key-child pairs, in insertion order.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Node> {
        self.0.iter_mut()
    }

    /// Returns the keys in lexicographic order.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<&String> {
        let mut keys: Vec<_> = self.0.keys().collect();
        keys.sort();
        keys
    }

    /// Returns the entries in lexicographic key order.
    #[must_use]
    pub fn sorted_iter(&self) -> Vec<(&String, &Node)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }
}

impl From<HashMap<String, Node>> for VdfMap {
    fn from(map: HashMap<String, Node>) -> Self {
        VdfMap(map.into_iter().collect())
    }
}

impl From<VdfMap> for HashMap<String, Node> {
    fn from(map: VdfMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for VdfMap {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VdfMap {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Node)> for VdfMap {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        VdfMap(IndexMap::from_iter(iter))
    }
}
