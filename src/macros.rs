/// Builds a [`Node`](crate::Node) tree from a JSON-like literal.
///
/// Braces make a map node; anything else becomes a scalar holding the value's
/// `Display` text.
///
/// ```rust
/// use serde_vdf::vdf;
///
/// let tree = vdf!({
///     "server": {
///         "name": "de-fra-1",
///         "port": 27015,
///         "secure": true
///     }
/// });
/// assert_eq!(tree.get_path(&["server", "port"]).and_then(|n| n.as_str()), Some("27015"));
/// ```
#[macro_export]
macro_rules! vdf {
    ({}) => {
        $crate::Node::map()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut node = $crate::Node::map();
        $(
            node.insert($key.to_string(), $crate::vdf!($value));
        )*
        node
    }};

    ($value:expr) => {
        $crate::Node::scalar(($value).to_string())
    };
}

#[cfg(test)]
mod tests {
    use crate::{Node, NodeKind};

    #[test]
    fn test_vdf_macro_scalars() {
        assert_eq!(vdf!("hello"), Node::scalar("hello"));
        assert_eq!(vdf!(42), Node::scalar("42"));
        assert_eq!(vdf!(false), Node::scalar("false"));
    }

    #[test]
    fn test_vdf_macro_maps() {
        assert_eq!(vdf!({}), Node::map());

        let tree = vdf!({
            "name": "Alice",
            "stats": { "level": 30 }
        });
        match &tree.kind {
            NodeKind::Map(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children.get("name"), Some(&Node::scalar("Alice")));
            }
            NodeKind::Scalar(_) => panic!("expected map"),
        }
        assert_eq!(tree.get_path(&["stats", "level"]), Some(&Node::scalar("30")));
    }
}
