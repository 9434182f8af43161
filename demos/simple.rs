//! Reading and writing a Steam app manifest.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_vdf::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    #[serde(rename = "AppState")]
    app_state: AppState,
}

#[derive(Debug, Serialize, Deserialize)]
struct AppState {
    appid: u32,
    name: String,
    #[serde(rename = "StateFlags")]
    state_flags: u32,
    installdir: String,
    #[serde(rename = "SizeOnDisk")]
    size_on_disk: u64,
    #[serde(rename = "AutoUpdateBehavior", default)]
    auto_update_behavior: u8,
}

const MANIFEST: &str = r#"
"AppState"
{
    "appid"         "440"
    "name"          "Team Fortress 2"
    "StateFlags"    "4"
    "installdir"    "Team Fortress 2"
    "SizeOnDisk"    "27182818284"
    "LastOwner"     "76561197960287930"
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    // Keys are lowercased while parsing; field names still match.
    let manifest: Manifest = from_str(MANIFEST)?;
    println!("Parsed: {:#?}\n", manifest);

    let mut manifest = manifest;
    manifest.app_state.auto_update_behavior = 1;

    // Output is canonical: sorted keys, four-space indentation.
    println!("Encoded:\n{}", to_string(&manifest)?);
    Ok(())
}
