//! Centralized error handling for cellmap.
//!
//! Every failure in the mapping engine is reported through [`CellMapError`]; the
//! library never panics on malformed cells or tags.
//!
//! ## Error Categories
//!
//! - **Unsupported kind** ([`CellMapError::UnsupportedKind`]): the field's type has no
//!   codec rule (for example a raw [`Cell`](crate::Cell) embedded as a field).
//! - **Malformed binary** ([`CellMapError::MalformedBinary`]): a fixed-width value whose
//!   byte length does not match the declared width.
//! - **Invalid value** ([`CellMapError::InvalidValue`]): bytes of the right width that
//!   still cannot be decoded (a 64-bit value out of range for `isize` / `usize`).
//! - **Malformed tag** ([`CellMapError::MalformedTag`]): only raised when strict tag
//!   checking is enabled in [`MapperOptions`](crate::MapperOptions).
//!
//! A missing column is **not** an error. Sparse rows simply leave the mapped field
//! untouched.
//!
//! ## Field Context
//!
//! Codec errors raised while a decoder or encoder walks a record are wrapped in
//! [`CellMapError::Field`], which carries the dotted path of the offending field:
//!
//! ```rust
//! use cellmap::{CellMapError, LeafKind};
//!
//! let err = CellMapError::MalformedBinary { kind: LeafKind::I64, expected: 8, actual: 4 }
//!     .in_field("profile.age");
//! assert_eq!(err.field(), Some("profile.age"));
//! assert!(matches!(err.root_cause(), CellMapError::MalformedBinary { .. }));
//! ```

use thiserror::Error;

use crate::codec::LeafKind;

/// A specialized `Result` type for cellmap operations.
pub type Result<T> = std::result::Result<T, CellMapError>;

/// The error enum covering every failure domain of the mapping engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellMapError {
    /// The field's type has no codec rule.
    #[error("unsupported field kind: {kind}")]
    UnsupportedKind {
        /// Kind reported by the offending value.
        kind: LeafKind,
    },

    /// A fixed-width value arrived with the wrong number of bytes.
    #[error("malformed {kind} cell: expected {expected} bytes, got {actual}")]
    MalformedBinary {
        /// Declared kind of the target field.
        kind: LeafKind,
        /// Width in bytes that the kind requires.
        expected: usize,
        /// Length of the cell value actually received.
        actual: usize,
    },

    /// Bytes of the right shape that are still not a valid value of the kind.
    #[error("invalid {kind} cell: {reason}")]
    InvalidValue {
        /// Declared kind of the target field.
        kind: LeafKind,
        /// Message from the underlying codec.
        reason: String,
    },

    /// A mapping tag that does not name a `family:qualifier` address.
    #[error("malformed mapping tag {tag:?}: expected `family{delimiter}qualifier`")]
    MalformedTag {
        /// The raw tag text.
        tag: String,
        /// Delimiter the tag was checked against.
        delimiter: char,
    },

    /// Wraps any of the above with the path of the field being processed.
    #[error("field `{field}`: {source}")]
    Field {
        /// Dotted path of the field (`address.street` for nested records).
        field: String,
        /// The underlying failure.
        #[source]
        source: Box<CellMapError>,
    },
}

impl CellMapError {
    /// Attaches a field path to this error.
    ///
    /// An error that already carries a path is returned unchanged so the innermost
    /// (most specific) path wins.
    pub fn in_field(self, field: &str) -> Self {
        match self {
            Self::Field { .. } => self,
            other => Self::Field {
                field: field.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the field path, if this error was raised while walking a record.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Strips any field context and returns the underlying failure.
    pub fn root_cause(&self) -> &CellMapError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
