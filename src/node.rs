//! The in-memory VDF document tree.
//!
//! A VDF document is a tree of [`Node`]s. Every node is either a map of named
//! children or a scalar string, and every node remembers the comments that
//! were attached to it and where it was defined in the source text.
//!
//! ## Core Types
//!
//! - [`Node`]: one element of the tree, with comments and a 1-indexed position
//! - [`NodeKind`]: the closed set of node shapes (`Map` or `Scalar`)
//!
//! ## Usage Patterns
//!
//! ### Parsing and inspecting
//!
//! ```rust
//! use serde_vdf::parse_str;
//!
//! let root = parse_str("\"a\" { \"b\" \"c\" }").unwrap();
//! let a = root.get("a").unwrap();
//! assert!(a.is_map());
//! assert_eq!((a.line, a.column), (1, 5));
//! assert_eq!(root.get_path(&["a", "b"]).and_then(|n| n.as_str()), Some("c"));
//! ```
//!
//! ### Building trees by hand
//!
//! ```rust
//! use serde_vdf::Node;
//!
//! let mut root = Node::map();
//! root.insert(
//!     "server",
//!     Node::scalar("eu-west").with_line_comment("primary region"),
//! );
//! assert_eq!(root.to_string(), "\"server\" \"eu-west\"\t// primary region\n");
//! ```
//!
//! ### Interop with other serde formats
//!
//! In human-readable formats map nodes serialize as maps and scalar nodes as
//! strings, so a tree converts directly to and from formats like JSON.
//! Comments and positions are only carried by this crate's own serializer and
//! by non-human-readable formats.
//!
//! ```rust
//! use serde_vdf::{vdf, Node};
//!
//! let tree = vdf!({ "game": { "name": "Half-Life" } });
//! let json = serde_json::to_string(&tree).unwrap();
//! assert_eq!(json, r#"{"game":{"name":"Half-Life"}}"#);
//!
//! let back: Node = serde_json::from_str(&json).unwrap();
//! assert_eq!(back, tree);
//! ```

use crate::VdfMap;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Newtype name under which nodes pass through serde, so this crate's own
/// serializer and deserializer keep their comments and position intact.
pub(crate) const NODE_TOKEN: &str = "$serde_vdf::private::Node";

/// First key of the full-fidelity map form of a node.
pub(crate) const RAW_NODE_KEY: &str = "$serde_vdf::private::raw";

/// One element of a VDF document tree.
///
/// `line` and `column` are 1-indexed. For a map child they point at its
/// opening `{`; for a scalar child they are derived from the closing quote of
/// the value. The document root is always at line 1, column 1. Nodes built by
/// hand or by the encoder carry position 0, 0 until they are parsed.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::{Node, NodeKind};
///
/// let scalar = Node::scalar("42");
/// assert!(scalar.is_scalar());
/// assert!(matches!(scalar.kind, NodeKind::Scalar(ref v) if v == "42"));
///
/// let map = Node::map();
/// assert!(map.is_map());
/// assert!(map.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// `//` lines that preceded this node, joined by `\n` and trimmed.
    pub head_comment: String,
    /// Trailing `//` comment on the same line as a scalar value.
    pub line_comment: String,
    pub line: usize,
    pub column: usize,
}

/// The shape of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Map(VdfMap),
    Scalar(String),
}

impl Default for Node {
    fn default() -> Self {
        Node::map()
    }
}

impl Node {
    /// Creates an empty map node.
    #[must_use]
    pub fn map() -> Self {
        Node::from_kind(NodeKind::Map(VdfMap::new()))
    }

    /// Creates a scalar node holding `value`.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Node::from_kind(NodeKind::Scalar(value.into()))
    }

    /// Creates a map node from an existing child map.
    #[must_use]
    pub fn from_map(children: VdfMap) -> Self {
        Node::from_kind(NodeKind::Map(children))
    }

    fn from_kind(kind: NodeKind) -> Self {
        Node {
            kind,
            head_comment: String::new(),
            line_comment: String::new(),
            line: 0,
            column: 0,
        }
    }

    /// Creates the document root: an empty map at line 1, column 1.
    #[must_use]
    pub fn root() -> Self {
        Node::map().with_position(1, 1)
    }

    /// Sets the head comment, returning the node.
    #[must_use]
    pub fn with_head_comment(mut self, comment: impl Into<String>) -> Self {
        self.head_comment = comment.into();
        self
    }

    /// Sets the line comment, returning the node.
    ///
    /// Line comments are only written for scalar nodes.
    #[must_use]
    pub fn with_line_comment(mut self, comment: impl Into<String>) -> Self {
        self.line_comment = comment.into();
        self
    }

    /// Sets the 1-indexed source position, returning the node.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Returns `true` if this is a map node.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self.kind, NodeKind::Map(_))
    }

    /// Returns `true` if this is a scalar node.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    /// Returns the scalar value, or `None` for map nodes.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(value) => Some(value),
            NodeKind::Map(_) => None,
        }
    }

    /// Returns the children of a map node.
    #[must_use]
    pub fn as_map(&self) -> Option<&VdfMap> {
        match &self.kind {
            NodeKind::Map(children) => Some(children),
            NodeKind::Scalar(_) => None,
        }
    }

    /// Returns the children of a map node, mutably.
    pub fn as_map_mut(&mut self) -> Option<&mut VdfMap> {
        match &mut self.kind {
            NodeKind::Map(children) => Some(children),
            NodeKind::Scalar(_) => None,
        }
    }

    /// Looks up a direct child by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|children| children.get(key))
    }

    /// Follows a path of keys from this node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::vdf;
    ///
    /// let tree = vdf!({ "items_game": { "game_info": { "max_num_stickers": "5" } } });
    /// let node = tree.get_path(&["items_game", "game_info", "max_num_stickers"]);
    /// assert_eq!(node.and_then(|n| n.as_str()), Some("5"));
    /// assert!(tree.get_path(&["items_game", "missing"]).is_none());
    /// ```
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Inserts a child, turning a scalar node into a map first.
    ///
    /// Returns the child previously stored under `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, child: Node) -> Option<Node> {
        if let NodeKind::Scalar(_) = self.kind {
            self.kind = NodeKind::Map(VdfMap::new());
        }
        match &mut self.kind {
            NodeKind::Map(children) => children.insert(key.into(), child),
            NodeKind::Scalar(_) => None,
        }
    }

    /// Number of children of a map node; scalars have none.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_map().map_or(0, VdfMap::len)
    }

    /// Returns `true` for maps without children and for every scalar.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compares two trees by shape, values and comments, ignoring positions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::{node_to_string, parse_str, vdf};
    ///
    /// let tree = vdf!({ "a": { "b": "c" } });
    /// let reparsed = parse_str(&node_to_string(&tree).unwrap()).unwrap();
    /// assert_ne!(reparsed, tree);
    /// assert!(reparsed.eq_ignoring_position(&tree));
    /// ```
    #[must_use]
    pub fn eq_ignoring_position(&self, other: &Node) -> bool {
        if self.head_comment != other.head_comment || self.line_comment != other.line_comment {
            return false;
        }
        match (&self.kind, &other.kind) {
            (NodeKind::Scalar(a), NodeKind::Scalar(b)) => a == b,
            (NodeKind::Map(a), NodeKind::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, child)| {
                        b.get(key)
                            .map_or(false, |other| child.eq_ignoring_position(other))
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for Node {
    /// Writes the canonical VDF text of this node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::new();
        crate::ser::write_document(&mut output, self, &crate::VdfOptions::default());
        f.write_str(&output)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::scalar(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::scalar(value)
    }
}

impl From<VdfMap> for Node {
    fn from(value: VdfMap) -> Self {
        Node::from_map(value)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(NODE_TOKEN, &Content(self))
    }
}

/// What a node serializes to inside its [`NODE_TOKEN`] newtype.
///
/// Human-readable formats get plain maps and strings. Everything else,
/// including this crate's own serializer, gets every field of the node in the
/// same layout [`RawNode`] reads back.
struct Content<'a>(&'a Node);

impl Serialize for Content<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let node = self.0;
        if serializer.is_human_readable() {
            return match &node.kind {
                NodeKind::Scalar(value) => serializer.serialize_str(value),
                NodeKind::Map(children) => Children(children).serialize(serializer),
            };
        }

        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry(RAW_NODE_KEY, "")?;
        map.serialize_entry("head_comment", &node.head_comment)?;
        map.serialize_entry("line_comment", &node.line_comment)?;
        map.serialize_entry("line", &node.line)?;
        map.serialize_entry("column", &node.column)?;
        match &node.kind {
            NodeKind::Scalar(value) => {
                map.serialize_entry("scalar", &true)?;
                map.serialize_entry("value", value)?;
            }
            NodeKind::Map(children) => {
                map.serialize_entry("scalar", &false)?;
                map.serialize_entry("children", &Children(children))?;
            }
        }
        map.end()
    }
}

struct Children<'a>(&'a VdfMap);

impl Serialize for Children<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, child) in self.0.sorted_iter() {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

/// Rebuilds a node from the map its full-fidelity form was projected onto.
pub(crate) fn node_from_fields(fields: Node) -> crate::Result<Node> {
    RawNode::deserialize(crate::Deserializer::from_node(fields)).map(Node::from)
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_newtype_struct(NODE_TOKEN, NodeVisitor)
    }
}

impl<'de> Deserialize<'de> for VdfMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VdfMapVisitor;

        impl<'de> Visitor<'de> for VdfMapVisitor {
            type Value = VdfMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of VDF nodes")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut children = VdfMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, child)) = map.next_entry::<String, Node>()? {
                    children.insert(key, child);
                }
                Ok(children)
            }
        }

        deserializer.deserialize_map(VdfMapVisitor)
    }
}

/// Comments, position and payload of a node, as handed over by this crate's
/// deserializer or by a non-human-readable format.
#[derive(Deserialize)]
struct RawNode {
    head_comment: String,
    line_comment: String,
    line: usize,
    column: usize,
    scalar: bool,
    #[serde(default)]
    value: String,
    #[serde(default)]
    children: VdfMap,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = if raw.scalar {
            NodeKind::Scalar(raw.value)
        } else {
            NodeKind::Map(raw.children)
        };
        Node {
            kind,
            head_comment: raw.head_comment,
            line_comment: raw.line_comment,
            line: raw.line,
            column: raw.column,
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a VDF map or string")
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
        Ok(Node::scalar(value.to_string()))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Node::scalar(value.to_string()))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Node::scalar(value.to_string()))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Node::scalar(value.to_string()))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Node::scalar(value))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
        Ok(Node::scalar(value))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Node::map())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(Node::map())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Node::deserialize(deserializer)
    }

    // Arrays have no VDF counterpart.
    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Node::map())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let first = match map.next_key::<String>()? {
            Some(key) => key,
            None => return Ok(Node::map()),
        };

        if first == RAW_NODE_KEY {
            map.next_value::<IgnoredAny>()?;
            let raw = RawNode::deserialize(de::value::MapAccessDeserializer::new(map))?;
            return Ok(raw.into());
        }

        let mut children = VdfMap::with_capacity(map.size_hint().unwrap_or(0) + 1);
        children.insert(first, map.next_value::<Node>()?);
        while let Some((key, child)) = map.next_entry::<String, Node>()? {
            children.insert(key, child);
        }
        Ok(Node::from_map(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_converts_scalar_to_map() {
        let mut node = Node::scalar("x");
        assert!(node.insert("a", Node::scalar("1")).is_none());
        assert!(node.is_map());
        assert_eq!(node.get("a").and_then(|n| n.as_str()), Some("1"));
    }

    #[test]
    fn test_scalar_has_no_children() {
        let node = Node::scalar("x");
        assert_eq!(node.len(), 0);
        assert!(node.get("x").is_none());
        assert!(node.as_map().is_none());
    }

    #[test]
    fn test_eq_ignoring_position() {
        let a = Node::scalar("v").with_position(3, 9);
        let b = Node::scalar("v").with_position(1, 1);
        assert_ne!(a, b);
        assert!(a.eq_ignoring_position(&b));

        let c = Node::scalar("v").with_head_comment("note");
        assert!(!a.eq_ignoring_position(&c));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let mut a = Node::map();
        a.insert("x", Node::scalar("1"));
        a.insert("y", Node::scalar("2"));

        let mut b = Node::map();
        b.insert("y", Node::scalar("2"));
        b.insert("x", Node::scalar("1"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_json_interop_stringifies_primitives() {
        let node: Node = serde_json::from_str(r#"{"a": 1, "b": true, "c": {"d": "e"}}"#).unwrap();
        assert_eq!(node.get("a").and_then(|n| n.as_str()), Some("1"));
        assert_eq!(node.get("b").and_then(|n| n.as_str()), Some("true"));
        assert_eq!(node.get_path(&["c", "d"]).and_then(|n| n.as_str()), Some("e"));
    }

    #[test]
    fn test_json_interop_invalid_input_is_empty_map() {
        let node: Node = serde_json::from_str("null").unwrap();
        assert_eq!(node, Node::map());

        let node: Node = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(node, Node::map());
    }
}
