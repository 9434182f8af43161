//! Configuration options for VDF parsing and encoding.
//!
//! [`VdfOptions`] controls the small number of knobs the codec exposes:
//!
//! - indentation width of the encoder (canonical output uses 4 spaces)
//! - whether the parser lowercases keys (the default, matching how VDF
//!   consumers treat keys case-insensitively)
//! - the maximum nesting depth the parser accepts
//!
//! ## Examples
//!
//! ```rust
//! use serde_vdf::{node_to_string_with_options, vdf, VdfOptions};
//!
//! let tree = vdf!({ "outer": { "inner": "value" } });
//!
//! let options = VdfOptions::new().with_indent(2);
//! let text = node_to_string_with_options(&tree, &options).unwrap();
//! assert_eq!(text, "\"outer\" {\n  \"inner\" \"value\"\n}\n");
//! ```

/// Configuration options for VDF parsing and encoding.
///
/// # Examples
///
/// ```rust
/// use serde_vdf::VdfOptions;
///
/// // Canonical defaults
/// let options = VdfOptions::new();
/// assert_eq!(options.indent, 4);
/// assert!(options.lowercase_keys);
///
/// // Custom configuration
/// let options = VdfOptions::new()
///     .with_indent(2)
///     .with_lowercase_keys(false)
///     .with_max_depth(64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfOptions {
    pub indent: usize,
    pub lowercase_keys: bool,
    pub max_depth: usize,
}

impl Default for VdfOptions {
    fn default() -> Self {
        VdfOptions {
            indent: 4,
            lowercase_keys: true,
            max_depth: 512,
        }
    }
}

impl VdfOptions {
    /// Creates default options (4-space indent, lowercased keys, depth limit 512).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of spaces written per nesting level by the encoder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::VdfOptions;
    ///
    /// let options = VdfOptions::new().with_indent(8);
    /// assert_eq!(options.indent, 8);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Controls whether the parser lowercases keys as it reads them.
    #[must_use]
    pub fn with_lowercase_keys(mut self, lowercase: bool) -> Self {
        self.lowercase_keys = lowercase;
        self
    }

    /// Sets how many maps may be open at once before the parser gives up.
    ///
    /// The root map counts as the first level.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
