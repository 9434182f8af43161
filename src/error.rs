//! Error types for VDF parsing, encoding and record binding.
//!
//! This module provides the error vocabulary shared by the parser, the encoder
//! and the serde binding layer.
//!
//! ## Error Categories
//!
//! - **Position Errors**: Any parse failure, wrapped with the line and column where it occurred
//! - **Parse Errors**: Structural or lexical problems (stray `}`, malformed comment, unexpected character)
//! - **Type Errors**: A scalar string that could not be coerced to the target field type
//! - **Overflow Errors**: A number that parsed but does not fit the target width
//! - **Validation Errors**: Misuse of the API (unsupported field kinds, non-record documents)
//!
//! ## Examples
//!
//! ```rust
//! use serde_vdf::{parse_str, Error};
//!
//! let err = parse_str("\"key\" \"value\" x").unwrap_err();
//! assert_eq!(err.position(), Some((1, 15)));
//!
//! match err.root_cause() {
//!     Error::Parse { message, .. } => assert_eq!(message, "unexpected character"),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::char::ParseCharError;
use std::str::ParseBoolError;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing VDF.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A failure tagged with the line and column where it happened
    #[error("line {line}, column {column}: {source}")]
    Position {
        line: usize,
        column: usize,
        #[source]
        source: Box<Error>,
    },

    /// Structural or lexical failure while parsing
    #[error("{message}{}", expected_found(expected, found))]
    Parse {
        message: String,
        expected: Option<String>,
        found: Option<String>,
    },

    /// Input ended inside a quoted string or after a lone `/`
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A scalar could not be converted to the target type
    #[error("error converting {value:?} to {ty}: {source}")]
    Type {
        ty: &'static str,
        value: String,
        #[source]
        source: ScalarError,
    },

    /// A number parsed but does not fit the target type
    #[error("{ty} value {value} overflows")]
    Overflow { ty: &'static str, value: String },

    /// Structural misuse of the binding layer or encoder
    #[error("validation error: {0}")]
    Validation(String),

    /// Attempted to encode an absent value
    #[error("cannot encode nil value")]
    NilValue,

    /// Reached an absent node while building or walking a tree
    #[error("cannot encode nil node")]
    NilNode,

    /// Custom error raised by serde impls or user capabilities
    #[error("{0}")]
    Custom(String),
}

/// The underlying standard-library failure behind an [`Error::Type`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    #[error(transparent)]
    Bool(#[from] ParseBoolError),
    #[error(transparent)]
    Char(#[from] ParseCharError),
}

fn expected_found(expected: &Option<String>, found: &Option<String>) -> String {
    match (expected, found) {
        (Some(expected), Some(found)) => format!(" (expected {:?}, found {:?})", expected, found),
        _ => String::new(),
    }
}

impl Error {
    /// Creates a parse error with just a message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::Error;
    ///
    /// let err = Error::parse("unexpected '}' at root level");
    /// assert_eq!(err.to_string(), "unexpected '}' at root level");
    /// ```
    pub fn parse(message: &str) -> Self {
        Error::Parse {
            message: message.to_string(),
            expected: None,
            found: None,
        }
    }

    /// Creates a parse error describing what was expected and what was found instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::Error;
    ///
    /// let err = Error::parse_expected("malformed comment", "//", "/x");
    /// assert!(err.to_string().contains("expected \"//\""));
    /// ```
    pub fn parse_expected(message: &str, expected: &str, found: &str) -> Self {
        Error::Parse {
            message: message.to_string(),
            expected: Some(expected.to_string()),
            found: Some(found.to_string()),
        }
    }

    /// Wraps an error with the line and column where it occurred.
    pub fn at(line: usize, column: usize, source: Error) -> Self {
        Error::Position {
            line,
            column,
            source: Box::new(source),
        }
    }

    /// Creates a type error for a scalar that failed to convert.
    pub fn type_error(ty: &'static str, value: &str, source: impl Into<ScalarError>) -> Self {
        Error::Type {
            ty,
            value: value.to_string(),
            source: source.into(),
        }
    }

    /// Creates an overflow error for a number too large for its target.
    pub fn overflow(ty: &'static str, value: &str) -> Self {
        Error::Overflow {
            ty,
            value: value.to_string(),
        }
    }

    /// Creates a validation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_vdf::Error;
    ///
    /// let err = Error::validation("unsupported type: sequence");
    /// assert_eq!(err.to_string(), "validation error: unsupported type: sequence");
    /// ```
    pub fn validation(msg: &str) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the line and column this error was tagged with, if any.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Position { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }

    /// Returns the innermost error, looking through position wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Error::Position { source, .. } = err {
            err = source;
        }
        err
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let err = Error::at(3, 7, Error::parse("unexpected '}' at root level"));
        assert_eq!(
            err.to_string(),
            "line 3, column 7: unexpected '}' at root level"
        );
        assert_eq!(err.position(), Some((3, 7)));
    }

    #[test]
    fn test_root_cause_unwraps_nested_positions() {
        let err = Error::at(1, 1, Error::at(2, 2, Error::UnexpectedEof));
        assert!(matches!(err.root_cause(), Error::UnexpectedEof));
    }

    #[test]
    fn test_type_error_keeps_source() {
        let source = "abc".parse::<i32>().unwrap_err();
        let err = Error::type_error("i32", "abc", source);
        assert!(err.to_string().starts_with("error converting \"abc\" to i32"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_overflow_display() {
        let err = Error::overflow("i64", "9223372036854775808");
        assert_eq!(err.to_string(), "i64 value 9223372036854775808 overflows");
    }
}
