//! Types that read and write their own VDF.
//!
//! Run with: cargo run --example custom_marshal

use serde::{Deserialize, Serialize};
use serde_vdf::{from_str, marshal_to_vec, to_string, Error, MarshalVdf, Node, UnmarshalVdf};
use std::error::Error as StdError;

/// A version stored as a single `"major.minor"` scalar, or as a block with
/// separate `major` and `minor` keys.
#[derive(Debug, PartialEq)]
struct Version {
    major: u32,
    minor: u32,
}

impl MarshalVdf for Version {
    fn marshal_vdf(&self) -> serde_vdf::Result<Vec<u8>> {
        Ok(format!(
            "// written by Version\n\"major\" \"{}\"\n\"minor\" \"{}\"\n",
            self.major, self.minor
        )
        .into_bytes())
    }
}

fn number(text: &str) -> serde_vdf::Result<u32> {
    text.parse()
        .map_err(|_| Error::validation(&format!("bad version number {text:?}")))
}

fn field<'a>(node: &'a Node, key: &str) -> serde_vdf::Result<&'a str> {
    node.get(key)
        .and_then(Node::as_str)
        .ok_or_else(|| Error::validation(&format!("missing {key}")))
}

impl UnmarshalVdf for Version {
    fn unmarshal_vdf(node: &Node) -> serde_vdf::Result<Self> {
        if let Some(text) = node.as_str() {
            let (major, minor) = text
                .split_once('.')
                .ok_or_else(|| Error::validation("expected major.minor"))?;
            return Ok(Version {
                major: number(major)?,
                minor: number(minor)?,
            });
        }
        Ok(Version {
            major: number(field(node, "major")?)?,
            minor: number(field(node, "minor")?)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Addon {
    name: String,
    #[serde(with = "serde_vdf::custom")]
    version: Version,
}

fn main() -> Result<(), Box<dyn StdError>> {
    let addon: Addon = from_str("\"name\" \"maps\"\n\"version\" \"2.7\"")?;
    println!("From a scalar: {:?}", addon);

    let addon: Addon = from_str("\"name\" \"maps\"\n\"version\" { \"major\" \"3\" \"minor\" \"1\" }")?;
    println!("From a block: {:?}\n", addon);

    println!("Inside a record:\n{}", to_string(&addon)?);

    let raw = marshal_to_vec(&addon.version)?;
    println!("On its own:\n{}", String::from_utf8(raw)?);

    if let Err(err) = from_str::<Addon>("\"name\" \"maps\"\n\"version\" \"three\"") {
        println!("Rejected: {err}");
    }
    Ok(())
}
