//! The VDF text format
//!
//! This module documents the dialect of Valve's key/value format (VDF, also
//! known as KeyValues) read and written by this library.
//!
//! # Overview
//!
//! A VDF document is a sequence of key/value pairs. A value is either a quoted
//! string or a brace-delimited block of further pairs. There are no numbers,
//! booleans, arrays or nulls at the text level: every leaf is a string, and
//! typing happens when a tree is bound onto a Rust type.
//!
//! ```text
//! // Server configuration
//! "server"
//! {
//!     "name"      "de-fra-1"      // shown in the browser
//!     "port"      "27015"
//!     "rules"
//!     {
//!         "friendlyfire"  "0"
//!     }
//! }
//! ```
//!
//! # Syntax
//!
//! ## Keys and values
//!
//! Keys and scalar values are enclosed in double quotes. A key is followed by
//! whitespace and then either a quoted value or `{`. Line breaks between a key
//! and its value are allowed.
//!
//! **Rules**:
//! - Keys are lowercased while parsing unless
//!   [`VdfOptions::with_lowercase_keys`](crate::VdfOptions::with_lowercase_keys)
//!   turns this off
//! - The empty string `""` is a valid key
//! - A `{` with no key before it opens a block stored under the empty key
//! - A key followed directly by `}` or by the end of input is dropped
//!
//! ## Escapes
//!
//! Only one escape exists: a backslash before a quote inside a value. When the
//! parser meets a `"` inside a value it counts the backslashes directly before
//! it. An odd count means the quote is part of the value (one backslash is
//! removed); an even count, including zero, ends the value. All other
//! backslashes are kept as written.
//!
//! | Source text       | Decoded value     |
//! |-------------------|-------------------|
//! | `"say \"hi\""`    | `say "hi"`        |
//! | `"C:\\games"`     | `C:\\games`       |
//! | `"a\\\"b"`        | `a\\"b`           |
//!
//! Keys have no escapes: a key ends at the first `"`.
//!
//! The encoder writes values verbatim, so a value containing a bare `"` does
//! not survive an encode and re-parse unchanged.
//!
//! ## Comments
//!
//! `//` starts a comment that runs to the end of the line. A single `/` that is
//! not followed by another `/` is an error.
//!
//! - Comment lines before a key become that node's **head comment**. Several
//!   lines are joined with `\n`; each line is trimmed and empty lines are skipped.
//! - A comment after a scalar value, on the same line, becomes that node's
//!   **line comment**.
//!
//! ## Whitespace
//!
//! Any Unicode whitespace separates tokens. A byte order mark is skipped
//! wherever it appears. Input must be UTF-8.
//!
//! # Positions
//!
//! Lines and columns are 1-indexed and counted in code points; the byte order
//! mark occupies a column like any other character.
//!
//! - A block's position is that of its `{`
//! - A scalar's column is derived from the column just past its closing quote:
//!   `column - chars(value) - 3 - quotes(value)`, so for `"key" "value"` it is 6
//! - The document root is at line 1, column 1
//!
//! # Duplicate keys
//!
//! - A block whose key already names a block at the same level is merged into
//!   it: new children are added, same-named scalars are replaced, and the
//!   merged block keeps the position and head comment of its first occurrence
//! - A scalar whose key is already taken replaces the previous entry
//!
//! # Errors
//!
//! | Condition                               | Error                                   |
//! |-----------------------------------------|-----------------------------------------|
//! | `}` with no open block                  | `unexpected '}' at root level`          |
//! | `/` followed by anything other than `/` | `malformed comment`                     |
//! | any other character outside quotes      | `unexpected character`                  |
//! | input ends inside a key or value        | unexpected end of input                 |
//! | input ends after a single `/`           | unexpected end of input                 |
//! | bytes that are not UTF-8                | `invalid rune`                          |
//! | too many nested blocks                  | `maximum nesting depth exceeded`        |
//!
//! Every parse error is wrapped with the line and column it occurred at. For
//! `invalid rune` that is the position the first invalid byte occupies, so
//! `"a" "b"` followed by a newline and a `0xFF` byte fails at line 2, column 1.
//! Blocks still open when the input ends are closed silently.
//!
//! # Canonical output
//!
//! The encoder writes keys in sorted order with four spaces of indentation per
//! level, one pair per line:
//!
//! ```text
//! // Server configuration
//! "server" {
//!     "name" "de-fra-1"	// shown in the browser
//!     "port" "27015"
//!     "rules" {
//!         "friendlyfire" "0"
//!     }
//! }
//! ```
//!
//! An empty document produces no output.
