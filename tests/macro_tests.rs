use serde_vdf::{node_to_string, vdf, Node};

#[test]
fn test_vdf_macro_scalars() {
    assert_eq!(vdf!("hello world"), Node::scalar("hello world"));
    assert_eq!(vdf!(""), Node::scalar(""));
    assert_eq!(vdf!(true), Node::scalar("true"));
}

#[test]
fn test_vdf_macro_numbers() {
    assert_eq!(vdf!(42), Node::scalar("42"));
    assert_eq!(vdf!(3.5), Node::scalar("3.5"));
    assert_eq!(vdf!(-123), Node::scalar("-123"));
}

#[test]
fn test_vdf_macro_expressions() {
    let name = "Bob";
    let port: u16 = 27015;
    assert_eq!(vdf!(name), Node::scalar("Bob"));
    assert_eq!(vdf!(port + 1), Node::scalar("27016"));

    let tree = vdf!({ "name": name, "port": port });
    assert_eq!(tree.get("name").and_then(Node::as_str), Some("Bob"));
    assert_eq!(tree.get("port").and_then(Node::as_str), Some("27015"));
}

#[test]
fn test_vdf_macro_empty_map() {
    let tree = vdf!({});
    assert!(tree.is_map());
    assert!(tree.is_empty());
}

#[test]
fn test_vdf_macro_nested_maps() {
    let tree = vdf!({
        "appstate": {
            "appid": 440,
            "name": "Team Fortress 2",
            "installdir": "Team Fortress 2",
            "userconfig": { "language": "english" },
        }
    });

    assert_eq!(tree.len(), 1);
    let appstate = tree.get("appstate").unwrap();
    assert_eq!(appstate.len(), 4);
    assert_eq!(
        tree.get_path(&["appstate", "userconfig", "language"])
            .and_then(Node::as_str),
        Some("english")
    );
}

#[test]
fn test_vdf_macro_keeps_insertion_order() {
    let tree = vdf!({ "z": 1, "a": 2, "m": 3 });
    let keys: Vec<&str> = tree
        .as_map()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_vdf_macro_encodes_canonically() {
    let tree = vdf!({
        "b": { "y": "2", "x": "1" },
        "a": "0"
    });
    assert_eq!(
        node_to_string(&tree).unwrap(),
        "\"a\" \"0\"\n\"b\" {\n    \"x\" \"1\"\n    \"y\" \"2\"\n}\n"
    );
}

#[test]
fn test_vdf_macro_matches_parsed_tree() {
    let built = vdf!({ "server": { "name": "de-fra-1", "port": 27015 } });
    let parsed = serde_vdf::parse_str("\"server\" { \"name\" \"de-fra-1\" \"port\" \"27015\" }").unwrap();
    assert!(built.eq_ignoring_position(&parsed));
}
