//! VDF parsing and deserialization.
//!
//! This module provides the [`Parser`], which turns VDF text into a [`Node`]
//! tree, and the [`Deserializer`], which binds a tree onto Rust types
//! implementing `Deserialize`.
//!
//! ## Overview
//!
//! - **Single pass**: the parser reads the input one code point at a time with
//!   no backtracking and no recursion; open maps live on an explicit stack
//! - **Positions**: every node records the line and column where it was defined,
//!   and every error carries the position of the character that caused it
//! - **Comments**: `//` lines before a key and `//` comments after a value are
//!   kept on the nodes they belong to
//! - **Lenient endings**: input that ends with maps still open is not an error
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_vdf::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     name: String,
//!     port: u16,
//! }
//!
//! let text = "\"name\" \"de-fra-1\"\n\"port\" \"27015\"";
//! let server: Server = from_str(text).unwrap();
//! assert_eq!(server, Server { name: "de-fra-1".into(), port: 27015 });
//! ```
//!
//! ## Partial trees
//!
//! [`Parser::parse_partial`] returns whatever was built before a failure:
//!
//! ```rust
//! use serde_vdf::Parser;
//!
//! let (tree, result) = Parser::from_str("\"a\" \"1\"\n\"b\" \"2\" }").parse_partial();
//! assert!(result.is_err());
//! assert_eq!(tree.len(), 2);
//! ```

use crate::node::{NODE_TOKEN, RAW_NODE_KEY};
use crate::{Error, Node, NodeKind, Result, VdfMap, VdfOptions};
use serde::de::value::{
    BoolDeserializer, MapAccessDeserializer, StrDeserializer, StringDeserializer,
    UnitDeserializer, UsizeDeserializer,
};
use serde::de::{self, IntoDeserializer, Visitor};
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use tracing::{debug, trace};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// A map that is still open, together with the key it will be stored under.
struct Frame {
    key: String,
    node: Node,
}

/// The VDF parser.
///
/// Reads VDF text into a [`Node`] tree. Created via [`Parser::new`] or
/// [`Parser::from_str`]; each parser handles exactly one document.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::{Parser, VdfOptions};
///
/// let tree = Parser::from_str("\"Name\" \"value\"")
///     .with_options(VdfOptions::new().with_lowercase_keys(false))
///     .parse()
///     .unwrap();
/// assert!(tree.get("Name").is_some());
/// ```
pub struct Parser<'a> {
    input: &'a str,
    invalid_utf8: bool,
    options: VdfOptions,
    position: usize,
    line: usize,
    column: usize,
    // Position of the character most recently returned by `next_char`.
    mark: (usize, usize),
    stack: Vec<Frame>,
    key: Option<String>,
    head_comment: String,
}

impl<'a> Parser<'a> {
    /// Creates a parser over raw bytes.
    ///
    /// Bytes are decoded as UTF-8. Parsing stops with an "invalid rune" error
    /// when it reaches the first byte that is not valid UTF-8.
    pub fn new(input: &'a [u8]) -> Self {
        let (text, invalid_utf8) = match std::str::from_utf8(input) {
            Ok(text) => (text, false),
            Err(err) => (
                std::str::from_utf8(&input[..err.valid_up_to()]).unwrap_or_default(),
                true,
            ),
        };
        let mut parser = Parser::from_str(text);
        parser.invalid_utf8 = invalid_utf8;
        parser
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Parser {
            input,
            invalid_utf8: false,
            options: VdfOptions::default(),
            position: 0,
            line: 1,
            column: 1,
            mark: (1, 1),
            stack: vec![Frame {
                key: String::new(),
                node: Node::root(),
            }],
            key: None,
            head_comment: String::new(),
        }
    }

    /// Replaces the parser options.
    #[must_use]
    pub fn with_options(mut self, options: VdfOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses the whole input into a tree.
    ///
    /// Every error is wrapped in [`Error::Position`].
    pub fn parse(self) -> Result<Node> {
        let (root, result) = self.parse_partial();
        result.map(|()| root)
    }

    /// Parses the input, returning the tree built so far even when parsing fails.
    ///
    /// The tree returned next to an error is incomplete and should not be
    /// trusted beyond diagnostics.
    pub fn parse_partial(mut self) -> (Node, Result<()>) {
        debug!(bytes = self.input.len(), "parsing VDF document");
        let result = self.run();
        let lines = self.line;
        let root = self.finish();
        match &result {
            Ok(()) => debug!(lines, children = root.len(), "parsed VDF document"),
            Err(err) => debug!(%err, "VDF document failed to parse"),
        }
        (root, result)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.mark = (self.line, self.column);
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Tags `err` with the position of the last character read.
    fn error_at_mark(&self, err: Error) -> Error {
        Error::at(self.mark.0, self.mark.1, err)
    }

    /// The error for running out of input where more was required.
    fn end_of_input(&self) -> Error {
        let err = if self.invalid_utf8 {
            Error::parse("invalid rune")
        } else {
            Error::UnexpectedEof
        };
        Error::at(self.line, self.column, err)
    }

    fn top(&mut self) -> Result<&mut Node> {
        self.stack
            .last_mut()
            .map(|frame| &mut frame.node)
            .ok_or_else(|| Error::parse("empty parse stack"))
    }

    fn run(&mut self) -> Result<()> {
        while let Some(ch) = self.next_char() {
            match ch {
                '{' => self.open_map()?,
                '}' => self.close_map()?,
                '"' => self.read_string()?,
                '/' => self.read_head_comment()?,
                BYTE_ORDER_MARK => {}
                ch if ch.is_whitespace() => {}
                ch => {
                    return Err(self.error_at_mark(Error::parse_expected(
                        "unexpected character",
                        "valid VDF character",
                        &ch.to_string(),
                    )))
                }
            }
        }

        if self.invalid_utf8 {
            return Err(self.end_of_input());
        }
        Ok(())
    }

    fn open_map(&mut self) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            return Err(self.error_at_mark(Error::parse("maximum nesting depth exceeded")));
        }

        let (line, column) = self.mark;
        let key = self.key.take().unwrap_or_default();
        let head_comment = std::mem::take(&mut self.head_comment);
        let parent = self.top()?;

        let reopened = parent
            .as_map_mut()
            .and_then(|children| children.get_mut(&key))
            .filter(|existing| existing.is_map())
            .map(std::mem::take);

        let node = match reopened {
            Some(mut node) => {
                trace!(key = %key, line, column, "merging duplicate map");
                if node.head_comment.is_empty() {
                    node.head_comment = head_comment;
                }
                node
            }
            None => {
                // Reserve the slot now so the child keeps its place in source order.
                parent.insert(key.clone(), Node::map());
                Node::map()
                    .with_head_comment(head_comment)
                    .with_position(line, column)
            }
        };

        trace!(key = %key, depth = self.stack.len(), "opened map");
        self.stack.push(Frame { key, node });
        Ok(())
    }

    fn close_map(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(self.error_at_mark(Error::parse("unexpected '}' at root level")));
        }
        self.key = None;
        self.pop_frame();
        Ok(())
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            trace!(key = %frame.key, children = frame.node.len(), "closed map");
            if let Some(parent) = self.stack.last_mut() {
                parent.node.insert(frame.key, frame.node);
            }
        }
    }

    /// Closes every map still open and returns the root.
    fn finish(&mut self) -> Node {
        while self.stack.len() > 1 {
            self.pop_frame();
        }
        self.stack
            .pop()
            .map(|frame| frame.node)
            .unwrap_or_else(Node::root)
    }

    fn read_string(&mut self) -> Result<()> {
        match self.key.take() {
            None => {
                let key = self.read_key()?;
                self.key = Some(if self.options.lowercase_keys {
                    key.to_lowercase()
                } else {
                    key
                });
                Ok(())
            }
            Some(key) => self.read_value(key),
        }
    }

    fn read_key(&mut self) -> Result<String> {
        let mut key = String::new();
        loop {
            match self.next_char() {
                Some('"') => return Ok(key),
                Some(ch) => key.push(ch),
                None => return Err(self.end_of_input()),
            }
        }
    }

    fn read_value(&mut self, key: String) -> Result<()> {
        let mut value = String::new();
        loop {
            match self.next_char() {
                Some('"') => {
                    // An odd run of backslashes escapes the quote.
                    let backslashes = value.chars().rev().take_while(|&c| c == '\\').count();
                    if backslashes % 2 == 0 {
                        break;
                    }
                    value.pop();
                    value.push('"');
                }
                Some(ch) => value.push(ch),
                None => return Err(self.end_of_input()),
            }
        }

        let quotes = value.matches('"').count();
        let column = self
            .column
            .saturating_sub(value.chars().count() + 3 + quotes);
        let line = self.line;
        let line_comment = self.read_line_comment();

        let node = Node::scalar(value)
            .with_head_comment(std::mem::take(&mut self.head_comment))
            .with_line_comment(line_comment)
            .with_position(line, column);
        self.top()?.insert(key, node);
        Ok(())
    }

    /// Consumes a `//` comment that follows a value on the same line.
    fn read_line_comment(&mut self) -> String {
        let rest = self.input[self.position..].trim_start_matches(|c: char| c == ' ' || c == '\t');
        if !rest.starts_with("//") {
            return String::new();
        }

        while matches!(self.peek_char(), Some(' ' | '\t')) {
            self.next_char();
        }
        self.next_char();
        self.next_char();
        self.rest_of_line().trim().to_string()
    }

    fn read_head_comment(&mut self) -> Result<()> {
        match self.next_char() {
            Some('/') => {}
            Some(ch) => {
                return Err(self.error_at_mark(Error::parse_expected(
                    "malformed comment",
                    "//",
                    &format!("/{ch}"),
                )))
            }
            None => return Err(self.end_of_input()),
        }

        let line = self.rest_of_line();
        let comment = line.trim();
        if !comment.is_empty() {
            if !self.head_comment.is_empty() {
                self.head_comment.push('\n');
            }
            self.head_comment.push_str(comment);
        }
        Ok(())
    }

    /// Reads up to and including the next newline, returning the text before it.
    fn rest_of_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(ch) = self.next_char() {
            if ch == '\n' {
                break;
            }
            line.push(ch);
        }
        line
    }
}

/// Binds a [`Node`] tree onto Rust types.
///
/// Map nodes deserialize as maps and structs, scalar nodes as strings,
/// booleans, numbers, chars and unit enum variants. Struct fields are matched
/// by exact name first and case-insensitively second; keys that match no field
/// are passed through for serde to ignore.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_vdf::{vdf, Deserializer};
///
/// #[derive(Deserialize)]
/// struct Limits {
///     #[serde(rename = "maxPlayers")]
///     max_players: u8,
/// }
///
/// let tree = vdf!({ "maxplayers": "32" });
/// let limits = Limits::deserialize(Deserializer::from_node(tree)).unwrap();
/// assert_eq!(limits.max_players, 32);
/// ```
pub struct Deserializer {
    node: Node,
}

impl Deserializer {
    pub fn from_node(node: Node) -> Self {
        Deserializer { node }
    }

    /// Parses `input` and returns a deserializer over its root.
    pub fn from_slice(input: &[u8]) -> Result<Self> {
        Parser::new(input).parse().map(Deserializer::from_node)
    }

    fn into_scalar(self, ty: &'static str) -> Result<String> {
        match self.node.kind {
            NodeKind::Scalar(value) => Ok(value),
            NodeKind::Map(_) => Err(Error::validation(&format!(
                "expected a scalar for {ty}, found a map"
            ))),
        }
    }
}

fn parse_integer<T>(value: &str, ty: &'static str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    value.parse::<T>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::overflow(ty, value),
        _ => Error::type_error(ty, value, err),
    })
}

fn is_infinity_literal(value: &str) -> bool {
    let digits = value.trim_start_matches(|c: char| c == '+' || c == '-');
    digits.eq_ignore_ascii_case("inf") || digits.eq_ignore_ascii_case("infinity")
}

fn parse_float(value: &str, ty: &'static str) -> Result<f64> {
    let parsed: f64 = value
        .parse()
        .map_err(|err| Error::type_error(ty, value, err))?;
    if parsed.is_infinite() && !is_infinity_literal(value) {
        return Err(Error::overflow(ty, value));
    }
    Ok(parsed)
}

/// Picks the declared name `key` refers to: exact match, then case-insensitive.
fn resolve_name(key: String, names: &'static [&'static str]) -> String {
    if names.iter().any(|name| *name == key) {
        return key;
    }
    let lowered = key.to_lowercase();
    names
        .iter()
        .find(|name| name.to_lowercase() == lowered)
        .map_or(key, |name| (*name).to_string())
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident: $ty:ty,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                let value = self.into_scalar(stringify!($ty))?;
                visitor.$visit(parse_integer::<$ty>(&value, stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node.kind {
            NodeKind::Scalar(value) => visitor.visit_string(value),
            NodeKind::Map(children) => visitor.visit_map(MapDeserializer::new(children, None)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.into_scalar("bool")?;
        let parsed = value
            .parse::<bool>()
            .map_err(|err| Error::type_error("bool", &value, err))?;
        visitor.visit_bool(parsed)
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.into_scalar("f32")?;
        let parsed = parse_float(&value, "f32")?;
        if parsed.is_finite() && parsed.abs() > f64::from(f32::MAX) {
            return Err(Error::overflow("f32", &value));
        }
        visitor.visit_f32(parsed as f32)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.into_scalar("f64")?;
        visitor.visit_f64(parse_float(&value, "f64")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let value = self.into_scalar("char")?;
        let parsed = value
            .parse::<char>()
            .map_err(|err| Error::type_error("char", &value, err))?;
        visitor.visit_char(parsed)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.into_scalar("string")?)
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation("unsupported type: bytes"))
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation("unsupported type: bytes"))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // Absent keys never reach the deserializer; anything present is `Some`.
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if name == NODE_TOKEN {
            return visitor.visit_map(RawNodeAccess::new(self.node));
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation("unsupported type: sequence"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation("unsupported type: tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation(&format!(
            "unsupported type: tuple struct {name}"
        )))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node.kind {
            NodeKind::Map(children) => visitor.visit_map(MapDeserializer::new(children, None)),
            NodeKind::Scalar(value) => Err(Error::validation(&format!(
                "expected a map, found scalar {value:?}"
            ))),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node.kind {
            NodeKind::Map(children) => {
                visitor.visit_map(MapDeserializer::new(children, Some(fields)))
            }
            NodeKind::Scalar(value) => Err(Error::validation(&format!(
                "expected a map for struct {name}, found scalar {value:?}"
            ))),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node.kind {
            NodeKind::Scalar(variant) => {
                visitor.visit_enum(EnumDeserializer::new(resolve_name(variant, variants), None))
            }
            NodeKind::Map(children) => {
                let mut entries = children.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumDeserializer::new(
                        resolve_name(variant, variants),
                        Some(value),
                    )),
                    _ => Err(Error::validation(&format!(
                        "expected a single-entry map for enum {name}"
                    ))),
                }
            }
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Node>,
    value: Option<Node>,
    fields: Option<&'static [&'static str]>,
}

impl MapDeserializer {
    fn new(map: VdfMap, fields: Option<&'static [&'static str]>) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            fields,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                let key = match self.fields {
                    Some(fields) => resolve_name(key, fields),
                    None => key,
                };
                seed.deserialize(Deserializer::from_node(Node::scalar(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::from_node(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Node>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<Node>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Deserializer::from_node(Node::scalar(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Node>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(node) if node.is_map() && node.is_empty() => Ok(()),
            Some(_) => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(node) => seed.deserialize(Deserializer::from_node(node)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::validation("unsupported type: tuple variant"))
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value.map(|node| node.kind) {
            Some(NodeKind::Map(children)) => {
                visitor.visit_map(MapDeserializer::new(children, Some(fields)))
            }
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

enum RawField {
    Marker,
    Text(String),
    Number(usize),
    Flag(bool),
    Children(VdfMap),
}

/// Hands a node to `Node`'s own `Deserialize` impl with comments and position.
pub(crate) struct RawNodeAccess {
    entries: std::vec::IntoIter<(&'static str, RawField)>,
    value: Option<RawField>,
}

impl RawNodeAccess {
    pub(crate) fn new(node: Node) -> Self {
        let mut entries = vec![
            (RAW_NODE_KEY, RawField::Marker),
            ("head_comment", RawField::Text(node.head_comment)),
            ("line_comment", RawField::Text(node.line_comment)),
            ("line", RawField::Number(node.line)),
            ("column", RawField::Number(node.column)),
        ];
        match node.kind {
            NodeKind::Scalar(value) => {
                entries.push(("scalar", RawField::Flag(true)));
                entries.push(("value", RawField::Text(value)));
            }
            NodeKind::Map(children) => {
                entries.push(("scalar", RawField::Flag(false)));
                entries.push(("children", RawField::Children(children)));
            }
        }
        RawNodeAccess {
            entries: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for RawNodeAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.value = Some(value);
                let key: StrDeserializer<'static, Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(RawField::Marker) => {
                let unit: UnitDeserializer<Error> = ().into_deserializer();
                seed.deserialize(unit)
            }
            Some(RawField::Text(text)) => {
                let text: StringDeserializer<Error> = text.into_deserializer();
                seed.deserialize(text)
            }
            Some(RawField::Number(number)) => {
                let number: UsizeDeserializer<Error> = number.into_deserializer();
                seed.deserialize(number)
            }
            Some(RawField::Flag(flag)) => {
                let flag: BoolDeserializer<Error> = flag.into_deserializer();
                seed.deserialize(flag)
            }
            Some(RawField::Children(children)) => {
                seed.deserialize(MapAccessDeserializer::new(MapDeserializer::new(children, None)))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn parse(input: &str) -> Node {
        Parser::from_str(input).parse().unwrap()
    }

    fn parse_err(input: &str) -> Error {
        Parser::from_str(input).parse().unwrap_err()
    }

    #[test]
    fn test_scalar_position() {
        let root = parse("\"key\" \"value\"");
        let node = root.get("key").unwrap();
        assert_eq!(node.as_str(), Some("value"));
        assert_eq!((node.line, node.column), (1, 6));
    }

    #[test]
    fn test_map_position_is_opening_brace() {
        let root = parse("\"a\" {}");
        let node = root.get("a").unwrap();
        assert!(node.is_map());
        assert_eq!((node.line, node.column), (1, 5));
    }

    #[test]
    fn test_byte_order_mark_counts_as_column() {
        let root = parse("\u{FEFF}\"key\" \"value\"");
        assert_eq!(root.get("key").unwrap().column, 7);
    }

    #[test]
    fn test_escaped_quote_shifts_column() {
        let root = parse(r#""k" "a\"b""#);
        let node = root.get("k").unwrap();
        assert_eq!(node.as_str(), Some("a\"b"));
        assert_eq!(node.column, 4);
    }

    #[test]
    fn test_line_comment_does_not_shift_following_lines() {
        let root = parse("\"a\" \"1\" // first\n\"b\" \"2\"");
        let a = root.get("a").unwrap();
        assert_eq!(a.line_comment, "first");
        let b = root.get("b").unwrap();
        assert_eq!((b.line, b.column), (2, 4));
        assert!(b.head_comment.is_empty());
    }

    #[test]
    fn test_comment_on_next_line_is_head_comment() {
        let root = parse("\"a\" \"1\"\n// about b\n\"b\" \"2\"");
        assert!(root.get("a").unwrap().line_comment.is_empty());
        assert_eq!(root.get("b").unwrap().head_comment, "about b");
    }

    #[test]
    fn test_keys_are_lowercased() {
        let root = parse("\"MixedCase\" \"Value\"");
        assert_eq!(root.get("mixedcase").and_then(|n| n.as_str()), Some("Value"));
    }

    #[test]
    fn test_empty_key_is_a_key() {
        let root = parse("\"\" \"value\"");
        assert_eq!(root.get("").and_then(|n| n.as_str()), Some("value"));
    }

    #[test]
    fn test_brace_without_key_uses_empty_key() {
        let root = parse("{ \"a\" \"b\" }");
        assert_eq!(root.get_path(&["", "a"]).and_then(|n| n.as_str()), Some("b"));
    }

    #[test]
    fn test_dangling_key_is_dropped() {
        let root = parse("\"a\" { \"lonely\" }");
        assert!(root.get("a").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_maps_merge() {
        let root = parse("\"m\" { \"x\" \"1\" }\n\"m\" { \"y\" \"2\" \"x\" \"3\" }");
        let m = root.get("m").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("x").and_then(|n| n.as_str()), Some("3"));
        assert_eq!(m.get("y").and_then(|n| n.as_str()), Some("2"));
        assert_eq!((m.line, m.column), (1, 5));
    }

    #[test]
    fn test_duplicate_scalar_last_wins() {
        let root = parse("\"k\" \"1\"\n\"k\" \"2\"");
        assert_eq!(root.get("k").and_then(|n| n.as_str()), Some("2"));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_children_keep_source_order() {
        let root = parse("\"z\" { }\n\"a\" \"1\"\n\"m\" \"2\"");
        let keys: Vec<_> = root.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_unclosed_maps_are_folded() {
        let root = parse("\"a\" { \"b\" { \"c\" \"d\"");
        assert_eq!(root.get_path(&["a", "b", "c"]).and_then(|n| n.as_str()), Some("d"));
    }

    #[test]
    fn test_max_depth() {
        let err = Parser::from_str("\"a\" { \"b\" { }")
            .with_options(VdfOptions::new().with_max_depth(2))
            .parse()
            .unwrap_err();
        assert_eq!(err.position(), Some((1, 11)));
        assert!(err.to_string().contains("maximum nesting depth exceeded"));
    }

    #[test]
    fn test_closing_brace_at_root() {
        let err = parse_err("}");
        assert_eq!(err.position(), Some((1, 1)));
        assert!(err.to_string().contains("unexpected '}' at root level"));
    }

    #[test]
    fn test_malformed_comment() {
        let err = parse_err("/x");
        match err.root_cause() {
            Error::Parse {
                message, found, ..
            } => {
                assert_eq!(message, "malformed comment");
                assert_eq!(found.as_deref(), Some("/x"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            parse_err("\"unclosed").root_cause(),
            Error::UnexpectedEof
        ));
        assert!(matches!(parse_err("/").root_cause(), Error::UnexpectedEof));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Parser::new(b"\"a\" \"b\"\n\xff").parse().unwrap_err();
        assert_eq!(err.position(), Some((2, 1)));
        assert!(err.to_string().contains("invalid rune"));
    }

    #[test]
    fn test_empty_stack_is_a_parse_error() {
        let mut parser = Parser::from_str("");
        parser.stack.clear();
        let err = parser.top().unwrap_err();
        assert!(matches!(err, Error::Parse { ref message, .. } if message == "empty parse stack"));
    }

    #[test]
    fn test_integer_overflow() {
        let err = i64::deserialize(Deserializer::from_node(Node::scalar(
            "9223372036854775808",
        )))
        .unwrap_err();
        assert!(matches!(err, Error::Overflow { ty: "i64", .. }));

        let err = u8::deserialize(Deserializer::from_node(Node::scalar("-1"))).unwrap_err();
        assert!(matches!(err, Error::Type { ty: "u8", .. }));
    }

    #[test]
    fn test_float_overflow() {
        let err = f32::deserialize(Deserializer::from_node(Node::scalar("1e39"))).unwrap_err();
        assert!(matches!(err, Error::Overflow { ty: "f32", .. }));

        let err = f64::deserialize(Deserializer::from_node(Node::scalar("1e400"))).unwrap_err();
        assert!(matches!(err, Error::Overflow { ty: "f64", .. }));

        let value = f64::deserialize(Deserializer::from_node(Node::scalar("-inf"))).unwrap();
        assert_eq!(value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_bool_is_strict() {
        let err = bool::deserialize(Deserializer::from_node(Node::scalar("1"))).unwrap_err();
        assert!(matches!(err, Error::Type { ty: "bool", .. }));
    }

    #[test]
    fn test_exact_node_survives_binding() {
        let root = parse("// header\n\"a\" \"b\" // trailing");
        let node = Node::deserialize(Deserializer::from_node(root.clone())).unwrap();
        assert_eq!(node, root);
        assert_eq!(node.get("a").unwrap().head_comment, "header");
    }
}
