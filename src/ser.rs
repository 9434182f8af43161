//! VDF serialization.
//!
//! This module provides the [`Encoder`], which writes [`Node`] trees as
//! canonical VDF text, and the [`NodeSerializer`], which projects Rust values
//! implementing `Serialize` onto a tree.
//!
//! ## Canonical form
//!
//! - keys are written in lexicographic order, so the same tree always encodes
//!   to the same bytes
//! - every key and value is wrapped in double quotes, with no escaping applied
//! - nested maps open with ` {` and close with `}` on their own line, indented
//!   by [`VdfOptions::indent`] spaces per level
//! - head comments are written as `// ` lines above their key, line comments as
//!   a tab and `// ` after their value
//! - an empty root map produces no output at all
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//! use serde_vdf::to_string;
//!
//! #[derive(Serialize)]
//! struct Server {
//!     port: u16,
//!     name: String,
//! }
//!
//! let server = Server { port: 27015, name: "de-fra-1".into() };
//! assert_eq!(to_string(&server).unwrap(), "\"name\" \"de-fra-1\"\n\"port\" \"27015\"\n");
//! ```
//!
//! ## Direct Encoder Usage
//!
//! ```rust
//! use serde_vdf::{vdf, Encoder};
//!
//! let mut out = Vec::new();
//! let mut encoder = Encoder::new(&mut out);
//! encoder.encode_node(&vdf!({ "a": { "b": "c" } })).unwrap();
//! assert_eq!(out, b"\"a\" {\n    \"b\" \"c\"\n}\n");
//! ```

use crate::custom::MarshalVdf;
use crate::node::{node_from_fields, NODE_TOKEN};
use crate::{Error, Node, NodeKind, Result, VdfMap, VdfOptions};
use serde::ser::Impossible;
use serde::{ser, Serialize};
use std::io;
use tracing::debug;

/// Writes VDF documents to an [`io::Write`] sink.
///
/// Each call writes one complete document. The encoder holds no state between
/// calls besides its writer and options.
pub struct Encoder<W> {
    writer: W,
    options: VdfOptions,
}

impl<W: io::Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Encoder::with_options(writer, VdfOptions::default())
    }

    pub fn with_options(writer: W, options: VdfOptions) -> Self {
        Encoder { writer, options }
    }

    /// Writes `node` in canonical form, keeping its comments.
    pub fn encode_node(&mut self, node: &Node) -> Result<()> {
        let mut output = String::with_capacity(256);
        write_document(&mut output, node, &self.options);
        debug!(bytes = output.len(), "encoded VDF document");
        self.writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Projects `value` onto a tree and writes it.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NilValue`] for a top-level `None` or unit, and with
    /// [`Error::Validation`] when `value` is not a record or map.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let node = to_node(value)?;
        self.encode_node(&node)
    }

    /// Writes whatever `value` marshals itself to, unchanged.
    pub fn encode_marshaler<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + MarshalVdf,
    {
        let data = value.marshal_vdf()?;
        debug!(bytes = data.len(), "encoded custom VDF document");
        self.writer.write_all(&data)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Projects a `Serialize` value onto a document tree.
///
/// The value must be a record or a map; `None` fields are left out.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_vdf::to_node;
///
/// #[derive(Serialize)]
/// struct Entry {
///     id: u32,
///     note: Option<String>,
/// }
///
/// let node = to_node(&Entry { id: 7, note: None }).unwrap();
/// assert_eq!(node.get("id").and_then(|n| n.as_str()), Some("7"));
/// assert!(node.get("note").is_none());
/// ```
pub fn to_node<T>(value: &T) -> Result<Node>
where
    T: ?Sized + Serialize,
{
    match value.serialize(NodeSerializer::new())? {
        Some(node) if node.is_map() => Ok(node),
        Some(node) => Err(Error::validation(&format!(
            "expected a record at the top level, found scalar {:?}",
            node.as_str().unwrap_or_default()
        ))),
        None => Err(Error::NilValue),
    }
}

pub(crate) fn write_document(output: &mut String, node: &Node, options: &VdfOptions) {
    match &node.kind {
        NodeKind::Map(children) => write_map(output, children, options, 0),
        NodeKind::Scalar(value) => {
            write_head_comment(output, &node.head_comment, options, 0);
            write_quoted(output, value);
            write_line_comment(output, &node.line_comment);
            output.push('\n');
        }
    }
}

fn write_map(output: &mut String, children: &VdfMap, options: &VdfOptions, level: usize) {
    for (key, child) in children.sorted_iter() {
        write_head_comment(output, &child.head_comment, options, level);
        write_indent(output, options, level);
        write_quoted(output, key);

        match &child.kind {
            NodeKind::Map(grandchildren) => {
                output.push_str(" {\n");
                write_map(output, grandchildren, options, level + 1);
                write_indent(output, options, level);
                output.push_str("}\n");
            }
            NodeKind::Scalar(value) => {
                output.push(' ');
                write_quoted(output, value);
                write_line_comment(output, &child.line_comment);
                output.push('\n');
            }
        }
    }
}

#[inline]
fn write_indent(output: &mut String, options: &VdfOptions, level: usize) {
    output.push_str(&" ".repeat(level * options.indent));
}

// Values are written verbatim; only the parser interprets `\"`.
#[inline]
fn write_quoted(output: &mut String, s: &str) {
    output.push('"');
    output.push_str(s);
    output.push('"');
}

fn write_head_comment(output: &mut String, comment: &str, options: &VdfOptions, level: usize) {
    if comment.is_empty() {
        return;
    }
    for line in comment.trim().split('\n') {
        write_indent(output, options, level);
        output.push_str("// ");
        output.push_str(line);
        output.push('\n');
    }
}

fn write_line_comment(output: &mut String, comment: &str) {
    if !comment.is_empty() {
        output.push_str("\t// ");
        output.push_str(comment);
    }
}

/// Serializer producing a [`Node`] from any `Serialize` value.
///
/// `Ok(None)` means the value was absent (`None`) and should be left out of
/// its parent. Sequences have no VDF representation and are rejected.
pub struct NodeSerializer {
    root: bool,
    // Set only while projecting the full-fidelity form of a `Node`.
    raw: bool,
}

impl NodeSerializer {
    pub fn new() -> Self {
        NodeSerializer {
            root: true,
            raw: false,
        }
    }

    fn nested() -> Self {
        NodeSerializer {
            root: false,
            raw: false,
        }
    }

    fn nil(&self) -> Error {
        if self.root {
            Error::NilValue
        } else {
            Error::NilNode
        }
    }
}

impl Default for NodeSerializer {
    fn default() -> Self {
        NodeSerializer::new()
    }
}

fn scalar(value: impl ToString) -> Result<Option<Node>> {
    Ok(Some(Node::scalar(value.to_string())))
}

fn unsupported(kind: &str) -> Error {
    Error::validation(&format!("unsupported type: {kind}"))
}

fn project<T>(value: &T) -> Result<Option<Node>>
where
    T: ?Sized + Serialize,
{
    value.serialize(NodeSerializer::nested())
}

impl ser::Serializer for NodeSerializer {
    type Ok = Option<Node>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<Node>, Error>;
    type SerializeTuple = Impossible<Option<Node>, Error>;
    type SerializeTupleStruct = Impossible<Option<Node>, Error>;
    type SerializeTupleVariant = Impossible<Option<Node>, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn is_human_readable(&self) -> bool {
        !self.raw
    }

    fn serialize_bool(self, v: bool) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Option<Node>> {
        scalar(v)
    }

    // `Display` gives the shortest text that parses back to the same float.
    fn serialize_f32(self, v: f32) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_str(self, v: &str) -> Result<Option<Node>> {
        scalar(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Option<Node>> {
        Err(unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Option<Node>> {
        if self.root {
            return Err(Error::NilValue);
        }
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<Node>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<Node>> {
        Err(self.nil())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<Node>> {
        Err(self.nil())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<Node>> {
        scalar(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Option<Node>>
    where
        T: ?Sized + Serialize,
    {
        if name == NODE_TOKEN {
            let fields = value.serialize(NodeSerializer {
                root: self.root,
                raw: true,
            })?;
            return fields.map(node_from_fields).transpose();
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Option<Node>>
    where
        T: ?Sized + Serialize,
    {
        let mut node = Node::map();
        if let Some(inner) = project(value)? {
            node.insert(variant, inner);
        }
        Ok(Some(node))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported(&format!("tuple struct {name}")))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported("tuple variant"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(SerializeMap::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: SerializeMap::new(len),
        })
    }
}

pub struct SerializeMap {
    map: VdfMap,
    current_key: Option<String>,
}

impl SerializeMap {
    fn new(capacity: usize) -> Self {
        SerializeMap {
            map: VdfMap::with_capacity(capacity),
            current_key: None,
        }
    }

    fn insert<T>(&mut self, key: String, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if let Some(node) = project(value)? {
            self.map.insert(key, node);
        }
        Ok(())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<Node>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match project(key)?.map(|node| node.kind) {
            Some(NodeKind::Scalar(key)) => {
                self.current_key = Some(key);
                Ok(())
            }
            _ => Err(Error::validation("map keys must be scalars")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Option<Node>> {
        Ok(Some(Node::from_map(self.map)))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<Node>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Node>> {
        Ok(Some(Node::from_map(self.map)))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    fields: SerializeMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Option<Node>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Node>> {
        let mut node = Node::map();
        node.insert(self.variant, Node::from_map(self.fields.map));
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn encode(node: &Node) -> String {
        let mut output = String::new();
        write_document(&mut output, node, &VdfOptions::default());
        output
    }

    #[test]
    fn test_keys_are_sorted() {
        let mut root = Node::map();
        root.insert("b", Node::scalar("2"));
        root.insert("a", Node::scalar("1"));
        assert_eq!(encode(&root), "\"a\" \"1\"\n\"b\" \"2\"\n");
    }

    #[test]
    fn test_empty_root_writes_nothing() {
        assert_eq!(encode(&Node::map()), "");
    }

    #[test]
    fn test_empty_child_map_keeps_braces() {
        let mut root = Node::map();
        root.insert("empty", Node::map());
        assert_eq!(encode(&root), "\"empty\" {\n}\n");
    }

    #[test]
    fn test_comments() {
        let mut inner = Node::map().with_head_comment("section\nsecond line");
        inner.insert("key", Node::scalar("value").with_line_comment("note"));
        let mut root = Node::map();
        root.insert("outer", inner);

        assert_eq!(
            encode(&root),
            "// section\n// second line\n\"outer\" {\n    \"key\" \"value\"\t// note\n}\n"
        );
    }

    #[test]
    fn test_scalar_document() {
        let node = Node::scalar("lonely").with_line_comment("by itself");
        assert_eq!(encode(&node), "\"lonely\"\t// by itself\n");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut root = Node::map();
        root.insert("path", Node::scalar(r"C:\games\hl2"));
        assert_eq!(encode(&root), "\"path\" \"C:\\games\\hl2\"\n");
    }

    #[test]
    fn test_project_primitives() {
        let mut map = BTreeMap::new();
        map.insert("float", 1.5f64);
        map.insert("whole", 2.0f64);
        let node = to_node(&map).unwrap();
        assert_eq!(node.get("float").and_then(|n| n.as_str()), Some("1.5"));
        assert_eq!(node.get("whole").and_then(|n| n.as_str()), Some("2"));
    }

    #[test]
    fn test_project_rejects_top_level_scalar() {
        assert!(matches!(to_node(&42), Err(Error::Validation(_))));
    }

    #[test]
    fn test_project_nil() {
        assert!(matches!(to_node(&()), Err(Error::NilValue)));
        assert!(matches!(to_node(&None::<BTreeMap<String, String>>), Err(Error::NilValue)));

        let mut map = BTreeMap::new();
        map.insert("unit", ());
        assert!(matches!(to_node(&map), Err(Error::NilNode)));
    }

    #[test]
    fn test_project_rejects_sequences() {
        let mut map = BTreeMap::new();
        map.insert("list", vec![1, 2, 3]);
        assert!(matches!(to_node(&map), Err(Error::Validation(_))));
    }

    #[test]
    fn test_encoder_writes_to_sink() {
        let mut root = Node::map();
        root.insert("k", Node::scalar("v"));
        let mut encoder = Encoder::with_options(Vec::new(), VdfOptions::new().with_indent(2));
        encoder.encode_node(&root).unwrap();
        assert_eq!(encoder.into_inner(), b"\"k\" \"v\"\n");
    }
}
