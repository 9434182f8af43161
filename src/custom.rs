//! Custom marshal and unmarshal capabilities.
//!
//! Types that need full control over their VDF form implement [`MarshalVdf`]
//! and/or [`UnmarshalVdf`] instead of (or next to) the serde traits.
//!
//! - On the encode side the marshaled bytes are parsed back into a tree and
//!   spliced into the parent record, comments included. At the top level ([`crate::marshal_to_vec`])
//!   the bytes are written unchanged.
//! - On the decode side the capability receives the parsed [`Node`] for its key
//!   and builds the value itself.
//!
//! Use them on a field with `#[serde(with = "serde_vdf::custom")]`, or wrap the
//! field type in [`Custom`].
//!
//! ## Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_vdf::{from_str, to_string, Error, MarshalVdf, Node, Result, UnmarshalVdf};
//!
//! #[derive(Debug, PartialEq)]
//! struct Version(u32, u32);
//!
//! impl MarshalVdf for Version {
//!     fn marshal_vdf(&self) -> Result<Vec<u8>> {
//!         Ok(format!("\"major\" \"{}\"\n\"minor\" \"{}\"\n", self.0, self.1).into_bytes())
//!     }
//! }
//!
//! impl UnmarshalVdf for Version {
//!     fn unmarshal_vdf(node: &Node) -> Result<Self> {
//!         let part = |key| -> Result<u32> {
//!             let value = node.get(key).and_then(|n| n.as_str()).unwrap_or("0");
//!             value.parse().map_err(|err| Error::type_error("u32", value, err))
//!         };
//!         Ok(Version(part("major")?, part("minor")?))
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Addon {
//!     name: String,
//!     #[serde(with = "serde_vdf::custom")]
//!     version: Version,
//! }
//!
//! let addon = Addon { name: "maps".into(), version: Version(1, 4) };
//! let text = to_string(&addon).unwrap();
//! assert_eq!(text, "\"name\" \"maps\"\n\"version\" {\n    \"major\" \"1\"\n    \"minor\" \"4\"\n}\n");
//! assert_eq!(from_str::<Addon>(&text).unwrap(), addon);
//! ```

use crate::{Node, Parser, Result};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Deref, DerefMut};

/// A value that produces its own VDF text.
pub trait MarshalVdf {
    fn marshal_vdf(&self) -> Result<Vec<u8>>;
}

/// A value that builds itself from a parsed [`Node`].
pub trait UnmarshalVdf: Sized {
    fn unmarshal_vdf(node: &Node) -> Result<Self>;
}

impl MarshalVdf for Node {
    fn marshal_vdf(&self) -> Result<Vec<u8>> {
        crate::node_to_vec(self)
    }
}

impl UnmarshalVdf for Node {
    fn unmarshal_vdf(node: &Node) -> Result<Self> {
        Ok(node.clone())
    }
}

/// Serializes a [`MarshalVdf`] value, for use with `#[serde(with)]`.
///
/// Errors raised by the capability keep their message but surface as
/// [`Error::Custom`](crate::Error::Custom).
pub fn serialize<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: ?Sized + MarshalVdf,
    S: Serializer,
{
    let data = value.marshal_vdf().map_err(ser::Error::custom)?;
    let node = Parser::new(&data).parse().map_err(ser::Error::custom)?;
    node.serialize(serializer)
}

/// Deserializes an [`UnmarshalVdf`] value, for use with `#[serde(with)]`.
pub fn deserialize<'de, T, D>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: UnmarshalVdf,
    D: Deserializer<'de>,
{
    let node = Node::deserialize(deserializer)?;
    T::unmarshal_vdf(&node).map_err(de::Error::custom)
}

/// Wrapper routing a field through [`MarshalVdf`] and [`UnmarshalVdf`].
///
/// ```rust
/// use serde::Deserialize;
/// use serde_vdf::{from_str, Custom, Node, Result, UnmarshalVdf};
///
/// struct Keys(Vec<String>);
///
/// impl UnmarshalVdf for Keys {
///     fn unmarshal_vdf(node: &Node) -> Result<Self> {
///         let mut keys: Vec<String> = node.as_map().into_iter().flat_map(|m| m.keys().cloned()).collect();
///         keys.sort();
///         Ok(Keys(keys))
///     }
/// }
///
/// #[derive(Deserialize)]
/// struct Manifest {
///     files: Custom<Keys>,
/// }
///
/// let manifest: Manifest = from_str("\"files\" { \"b.txt\" \"1\" \"a.txt\" \"1\" }").unwrap();
/// assert_eq!(manifest.files.0 .0, vec!["a.txt", "b.txt"]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Custom<T>(pub T);

impl<T> Custom<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Custom<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Custom<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: MarshalVdf> Serialize for Custom<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(&self.0, serializer)
    }
}

impl<'de, T: UnmarshalVdf> Deserialize<'de> for Custom<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string, Error};
    use serde::{Deserialize, Serialize};

    #[derive(Debug)]
    struct Failing;

    impl MarshalVdf for Failing {
        fn marshal_vdf(&self) -> Result<Vec<u8>> {
            Err(Error::validation("refusing to marshal"))
        }
    }

    impl UnmarshalVdf for Failing {
        fn unmarshal_vdf(_node: &Node) -> Result<Self> {
            Err(Error::validation("refusing to unmarshal"))
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        inner: Custom<Failing>,
    }

    #[test]
    fn test_marshal_error_message_propagates() {
        let err = to_string(&Holder {
            inner: Custom(Failing),
        })
        .unwrap_err();
        assert!(err.to_string().contains("refusing to marshal"));
    }

    #[test]
    fn test_unmarshal_error_message_propagates() {
        let err = from_str::<Holder>("\"inner\" \"x\"").unwrap_err();
        assert!(err.to_string().contains("refusing to unmarshal"));
    }

    #[test]
    fn test_unmarshal_receives_comments_and_position() {
        #[derive(Deserialize)]
        struct Doc {
            section: Custom<Node>,
        }

        let doc: Doc = from_str("// about\n\"section\" {\n    \"k\" \"v\"\n}").unwrap();
        assert_eq!(doc.section.head_comment, "about");
        assert_eq!((doc.section.line, doc.section.column), (2, 11));
    }

    struct Annotated;

    impl MarshalVdf for Annotated {
        fn marshal_vdf(&self) -> Result<Vec<u8>> {
            Ok(b"// generated\n\"value\" \"a\"\t// pinned\n".to_vec())
        }
    }

    #[test]
    fn test_marshal_comments_survive_in_records() {
        #[derive(Serialize)]
        struct Doc {
            #[serde(with = "crate::custom")]
            field: Annotated,
        }

        let text = to_string(&Doc { field: Annotated }).unwrap();
        assert_eq!(
            text,
            "\"field\" {\n    // generated\n    \"value\" \"a\"\t// pinned\n}\n"
        );
    }
}
