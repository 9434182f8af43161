//! # serde_vdf
//!
//! A Serde-compatible codec for Valve's VDF (KeyValues) text format, with
//! comment and source position preservation.
//!
//! ## What is VDF?
//!
//! VDF is the nested key/value format used throughout Valve's games and tools:
//! `gameinfo.txt`, `items_game.txt`, Steam's `libraryfolders.vdf` and many
//! more. Every key and every leaf value is a quoted string; blocks of pairs are
//! wrapped in braces. See [`format`] for the full dialect.
//!
//! ## Key Features
//!
//! - **Document trees**: Parse into a [`Node`] tree that keeps `//` comments and
//!   the line and column of every node
//! - **Canonical output**: The encoder sorts keys, so encoding is deterministic
//! - **Serde Compatible**: Bind trees onto your types via `#[derive(Serialize, Deserialize)]`
//! - **Custom capabilities**: [`MarshalVdf`] and [`UnmarshalVdf`] for types that
//!   need their own representation
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! serde_vdf = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_vdf::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     name: String,
//!     port: u16,
//!     secure: bool,
//! }
//!
//! let server = Server {
//!     name: "de-fra-1".to_string(),
//!     port: 27015,
//!     secure: true,
//! };
//!
//! let text = to_string(&server).unwrap();
//! assert_eq!(text, "\"name\" \"de-fra-1\"\n\"port\" \"27015\"\n\"secure\" \"true\"\n");
//!
//! let server_back: Server = from_str(&text).unwrap();
//! assert_eq!(server, server_back);
//! ```
//!
//! ### Missing Keys
//!
//! Binding follows serde's rules for fields with no matching key: `Option`
//! fields become `None`, and any other field is a "missing field" error unless
//! it or its struct is marked `#[serde(default)]`. Add that attribute to get
//! zero values for absent keys:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_vdf::from_str;
//!
//! #[derive(Deserialize, Default)]
//! #[serde(default)]
//! struct Settings {
//!     volume: u8,
//!     muted: bool,
//! }
//!
//! let settings: Settings = from_str("\"volume\" \"7\"").unwrap();
//! assert!(!settings.muted);
//! ```
//!
//! ### Working with Document Trees
//!
//! ```rust
//! use serde_vdf::{node_to_string, parse_str};
//!
//! let text = r#"
//! // Library folders
//! "libraryfolders"
//! {
//!     "0"
//!     {
//!         "path"  "C:\Program Files (x86)\Steam"  // default install
//!     }
//! }
//! "#;
//!
//! let tree = parse_str(text).unwrap();
//! let folders = tree.get("libraryfolders").unwrap();
//! assert_eq!(folders.head_comment, "Library folders");
//! assert_eq!((folders.line, folders.column), (4, 1));
//!
//! let path = folders.get_path(&["0", "path"]).unwrap();
//! assert_eq!(path.as_str(), Some(r"C:\Program Files (x86)\Steam"));
//! assert_eq!(path.line_comment, "default install");
//!
//! // Comments survive re-encoding
//! let canonical = node_to_string(&tree).unwrap();
//! assert!(canonical.starts_with("// Library folders\n\"libraryfolders\" {\n"));
//! ```
//!
//! ### Building Trees with the vdf! Macro
//!
//! ```rust
//! use serde_vdf::{node_to_string, vdf};
//!
//! let tree = vdf!({
//!     "game": {
//!         "name": "Half-Life",
//!         "appid": 70
//!     }
//! });
//!
//! assert_eq!(
//!     node_to_string(&tree).unwrap(),
//!     "\"game\" {\n    \"appid\" \"70\"\n    \"name\" \"Half-Life\"\n}\n"
//! );
//! ```
//!
//! ## Error Handling
//!
//! Parse errors carry the line and column where they happened:
//!
//! ```rust
//! use serde_vdf::parse_str;
//!
//! let err = parse_str("\"a\" {\n}\n}").unwrap_err();
//! assert_eq!(err.to_string(), "line 3, column 1: unexpected '}' at root level");
//! ```
//!
//! ## Logging
//!
//! The parser and encoder emit [`tracing`] events at `debug` and `trace`
//! level. The library never installs a subscriber.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Records to VDF and back
//! - **`identify_nodes.rs`** - Walking a tree and reporting node positions
//! - **`custom_marshal.rs`** - Types with their own VDF representation
//!
//! Run any demo with: `cargo run --example <name>`

pub mod custom;
pub mod de;
pub mod error;
pub mod format;
pub mod macros;
pub mod map;
pub mod node;
pub mod options;
pub mod pool;
pub mod ser;

pub use custom::{Custom, MarshalVdf, UnmarshalVdf};
pub use de::{Deserializer, Parser};
pub use error::{Error, Result, ScalarError};
pub use map::VdfMap;
pub use node::{Node, NodeKind};
pub use options::VdfOptions;
pub use ser::{to_node, Encoder, NodeSerializer};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parse VDF bytes into a document tree.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::parse;
///
/// let tree = parse(b"\"a\" \"b\"").unwrap();
/// let a = tree.get("a").unwrap();
/// assert_eq!(a.as_str(), Some("b"));
/// assert_eq!((a.line, a.column), (1, 4));
/// ```
///
/// # Errors
///
/// Returns an [`Error::Position`] wrapping the first problem found.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(input: &[u8]) -> Result<Node> {
    Parser::new(input).parse()
}

/// Parse a VDF string into a document tree.
///
/// An empty string yields an empty root map at line 1, column 1.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str(input: &str) -> Result<Node> {
    Parser::from_str(input).parse()
}

/// Parse VDF bytes into a document tree using custom options.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::{parse_with_options, VdfOptions};
///
/// let options = VdfOptions::new().with_lowercase_keys(false);
/// let tree = parse_with_options(b"\"AppID\" \"440\"", &options).unwrap();
/// assert!(tree.get("AppID").is_some());
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(input: &[u8], options: &VdfOptions) -> Result<Node> {
    Parser::new(input).with_options(options.clone()).parse()
}

/// Deserialize an instance of type `T` from a document tree.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_vdf::{from_node, vdf};
///
/// #[derive(Deserialize)]
/// struct Entry { id: u32 }
///
/// let entry: Entry = from_node(&vdf!({ "id": "7" })).unwrap();
/// assert_eq!(entry.id, 7);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_node<T>(node: &Node) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::from_node(node.clone()))
}

/// Deserialize an instance of type `T` from a string of VDF text.
///
/// Deserializing into [`Node`] returns the parsed tree unchanged, comments and
/// positions included.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_vdf::from_str;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("\"x\" \"1\"\n\"y\" \"-2\"").unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
///
/// Keys with no matching field are ignored. A field with no matching key is
/// `None` for `Option` fields, its default under `#[serde(default)]`, and an
/// error otherwise.
///
/// # Errors
///
/// Returns an error if the text is malformed or does not match the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes())
}

/// Deserialize an instance of type `T` from VDF bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::from_slice(v)?)
}

/// Deserialize an instance of type `T` from an I/O stream of VDF.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_vdf::from_reader;
/// use std::io::Cursor;
///
/// #[derive(Deserialize)]
/// struct Config { port: u16 }
///
/// let config: Config = from_reader(Cursor::new("\"port\" \"8080\"")).unwrap();
/// assert_eq!(config.port, 8080);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    from_slice(&buffer)
}

/// Build a value through its [`UnmarshalVdf`] capability from VDF bytes.
///
/// Errors returned by the capability are passed through unchanged.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn unmarshal_from_slice<T>(v: &[u8]) -> Result<T>
where
    T: UnmarshalVdf,
{
    T::unmarshal_vdf(&parse(v)?)
}

/// Serialize any `T: Serialize` to a VDF string.
///
/// # Errors
///
/// Returns an error if `value` is not a record or map, contains sequences, or
/// is a top-level `None`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &VdfOptions::default())
}

/// Serialize any `T: Serialize` to a VDF string using custom options.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_vdf::{to_string_with_options, VdfOptions};
///
/// #[derive(Serialize)]
/// struct Outer { inner: Inner }
/// #[derive(Serialize)]
/// struct Inner { value: u8 }
///
/// let options = VdfOptions::new().with_indent(1);
/// let text = to_string_with_options(&Outer { inner: Inner { value: 1 } }, &options).unwrap();
/// assert_eq!(text, "\"inner\" {\n \"value\" \"1\"\n}\n");
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &VdfOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let node = to_node(value)?;
    node_to_string_with_options(&node, options)
}

/// Serialize any `T: Serialize` to VDF bytes.
///
/// The output is assembled in a pooled scratch buffer and copied out before
/// the buffer is returned to the pool.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut buffer = pool::buffers().acquire();
    Encoder::new(&mut *buffer).encode(value)?;
    Ok(buffer.to_vec())
}

/// Serialize any `T: Serialize` to a writer.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    Encoder::new(writer).encode(value)
}

/// Encode a document tree as canonical VDF text, keeping its comments.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn node_to_string(node: &Node) -> Result<String> {
    node_to_string_with_options(node, &VdfOptions::default())
}

/// Encode a document tree using custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn node_to_string_with_options(node: &Node, options: &VdfOptions) -> Result<String> {
    let mut output = String::with_capacity(256);
    ser::write_document(&mut output, node, options);
    Ok(output)
}

/// Encode a document tree as canonical VDF bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn node_to_vec(node: &Node) -> Result<Vec<u8>> {
    let mut buffer = pool::buffers().acquire();
    Encoder::new(&mut *buffer).encode_node(node)?;
    Ok(buffer.to_vec())
}

/// Encode a document tree to a writer.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn node_to_writer<W>(writer: W, node: &Node) -> Result<()>
where
    W: io::Write,
{
    Encoder::new(writer).encode_node(node)
}

/// Encode a value through its [`MarshalVdf`] capability.
///
/// The marshaled bytes are returned unchanged.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal_to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + MarshalVdf,
{
    let mut buffer = pool::buffers().acquire();
    Encoder::new(&mut *buffer).encode_marshaler(value)?;
    Ok(buffer.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        location: Point,
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let vdf = to_string(&point).unwrap();
        let point_back: Point = from_str(&vdf).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let user = User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            location: Point { x: -4, y: 9 },
        };

        let vdf = to_string(&user).unwrap();
        let user_back: User = from_str(&vdf).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn test_to_vec_matches_to_string() {
        let point = Point { x: 1, y: 2 };
        assert_eq!(to_vec(&point).unwrap(), to_string(&point).unwrap().into_bytes());
    }

    #[test]
    fn test_to_vec_output_outlives_buffer_reuse() {
        let first = to_vec(&Point { x: 1, y: 1 }).unwrap();
        let second = to_vec(&Point { x: 2, y: 2 }).unwrap();
        assert_eq!(first, b"\"x\" \"1\"\n\"y\" \"1\"\n");
        assert_eq!(second, b"\"x\" \"2\"\n\"y\" \"2\"\n");
    }

    #[test]
    fn test_from_str_into_node_keeps_comments() {
        let node: Node = from_str("// head\n\"a\" \"b\"").unwrap();
        let a = node.get("a").unwrap();
        assert_eq!(a.head_comment, "head");
        assert_eq!((a.line, a.column), (2, 4));
    }

    #[test]
    fn test_empty_input() {
        let node = parse(b"").unwrap();
        assert!(node.is_map());
        assert!(node.is_empty());
        assert_eq!((node.line, node.column), (1, 1));
    }

    #[test]
    fn test_custom_options() {
        let user = User {
            id: 1,
            name: "Bob".to_string(),
            active: false,
            location: Point { x: 0, y: 0 },
        };

        let options = VdfOptions::new().with_indent(8);
        let vdf = to_string_with_options(&user, &options).unwrap();
        assert!(vdf.contains("\n        \"x\" \"0\"\n"));
        let user_back: User = from_str(&vdf).unwrap();
        assert_eq!(user, user_back);
    }
}
