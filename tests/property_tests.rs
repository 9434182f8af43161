//! Property-based tests for the encode/parse cycle
//!
//! Records go through `to_string`/`from_str`, and generated document trees go
//! through the canonical encoder and back through the parser. Generated keys
//! are lowercase and text never contains `"` or `\`, which the format cannot
//! carry unchanged.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_vdf::{from_str, node_to_string, parse_str, to_string, Node, VdfMap};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Numbers {
    small: i8,
    signed: i64,
    unsigned: u64,
    ratio: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Profile {
    name: String,
    online: bool,
    level: Option<u32>,
    stats: Stats,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Stats {
    kills: u32,
    deaths: u32,
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.:-]{0,16}"
}

fn key() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

fn tree() -> impl Strategy<Value = Node> {
    let leaf = text().prop_map(Node::scalar);
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop::collection::vec((key(), inner), 0..6).prop_map(|entries| {
            Node::from_map(entries.into_iter().collect::<VdfMap>())
        })
    })
}

fn document() -> impl Strategy<Value = Node> {
    prop::collection::vec((key(), tree()), 0..6)
        .prop_map(|entries| Node::from_map(entries.into_iter().collect::<VdfMap>()))
}

proptest! {
    #[test]
    fn prop_numbers(
        small in any::<i8>(),
        signed in any::<i64>(),
        unsigned in any::<u64>(),
        ratio in -1.0e12f64..1.0e12,
    ) {
        let numbers = Numbers { small, signed, unsigned, ratio };
        prop_assert!(roundtrip(&numbers));
    }

    #[test]
    fn prop_profile(
        name in text(),
        online in any::<bool>(),
        level in proptest::option::of(any::<u32>()),
        kills in any::<u32>(),
        deaths in any::<u32>(),
    ) {
        let profile = Profile { name, online, level, stats: Stats { kills, deaths } };
        prop_assert!(roundtrip(&profile));
    }

    #[test]
    fn prop_tree_survives_encode_and_parse(doc in document()) {
        let text = node_to_string(&doc).unwrap();
        let parsed = parse_str(&text).unwrap();
        prop_assert!(parsed.eq_ignoring_position(&doc), "encoded as:\n{}", text);
    }

    #[test]
    fn prop_encoding_is_idempotent(doc in document()) {
        let first = node_to_string(&doc).unwrap();
        let second = node_to_string(&parse_str(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_parser_never_panics(input in "\\PC{0,64}") {
        let _ = parse_str(&input);
    }
}
