//! Locating keys in a document by line and column.
//!
//! Run with: cargo run --example identify_nodes

use serde_vdf::{node_to_string, parse_str, Node};
use std::error::Error;

const CONFIG: &str = r#"// Server configuration
"server"
{
    "name"      "de-fra-1"      // shown in the browser
    "port"      "27015"
    "rules"
    {
        // 0 disables
        "friendlyfire"  "0"
    }
}
"#;

fn walk(key: &str, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.as_map() {
        Some(children) => {
            println!("{indent}{key:?} block at {}:{}", node.line, node.column);
            for (child_key, child) in children.sorted_iter() {
                walk(child_key, child, depth + 1);
            }
        }
        None => println!(
            "{indent}{key:?} = {:?} at {}:{}",
            node.as_str().unwrap_or_default(),
            node.line,
            node.column
        ),
    }
    if !node.head_comment.is_empty() {
        println!("{indent}  head comment: {:?}", node.head_comment);
    }
    if !node.line_comment.is_empty() {
        println!("{indent}  line comment: {:?}", node.line_comment);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let root = parse_str(CONFIG)?;
    walk("", &root, 0);

    if let Some(port) = root.get_path(&["server", "port"]) {
        println!("\nport is on line {}", port.line);
    }

    // Comments are written back by the encoder.
    println!("\nCanonical form:\n{}", node_to_string(&root)?);

    match parse_str("\"server\" {\n    \"name\" \"x\" ]\n}") {
        Ok(_) => println!("unexpectedly parsed"),
        Err(err) => println!("Broken input: {err}"),
    }
    Ok(())
}
