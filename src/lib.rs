//! # cellmap
//!
//! Tag-driven mapping between Rust records and the sparse, column-family oriented
//! rows of a wide-column store (Bigtable and friends).
//!
//! ## Overview
//!
//! A wide-column row is a bag of byte cells addressed by `family:qualifier`. cellmap
//! lets you describe, field by field, where each part of a record lives in that bag
//! and then converts in both directions:
//!
//! *   **Decode:** a [`Row`] (cells grouped by family) or a flat `[Cell]` list is
//!     turned back into a typed record.
//! *   **Encode:** a record is turned into a [`Mutation`], the list of column writes
//!     to apply to one row at one timestamp.
//!
//! The engine is purely computational: no I/O, no connections, no retries. Those
//! belong to the storage client.
//!
//! ## Architecture
//!
//! ### Descriptor tables
//!
//! `#[derive(CellRecord)]` generates, at compile time, a table of field descriptors
//! for a struct: the field name, its raw mapping tag, and a borrowed accessor that is
//! either a leaf ([`CellValue`]) or a nested record ([`CellRecord`]). There is no
//! runtime type inspection.
//!
//! ### Resolver
//!
//! The [`resolver`] parses each tag into a [`TagInfo`] and flattens nested records
//! with an explicit worklist, so deeply nested records never recurse on the native
//! stack.
//!
//! ### Codec
//!
//! The [`codec`] module owns the byte layout of every leaf kind: big-endian fixed
//! width numerics, one-byte booleans, verbatim strings and bytes, and `Option<T>`
//! for nullable fields.
//!
//! ## Mapping Tags
//!
//! | Tag                            | Meaning                                   |
//! |--------------------------------|-------------------------------------------|
//! | `"-"`                          | excluded from all mapping                 |
//! | `",rowkey"`                    | bound to the row key                      |
//! | `"family:qualifier"`           | bound to that column                      |
//! | `"family:qualifier,omitempty"` | as above, not written when zero           |
//! | *(no attribute)*               | excluded                                  |
//!
//! Nested records are marked with `#[cell(nested)]` and share the parent's column
//! namespace.
//!
//! ## Usage
//!
//! ```rust
//! use cellmap::{decode_row, encode_columns, Cell, CellRecord, Row, Timestamp};
//!
//! #[derive(Debug, Default, PartialEq, CellRecord)]
//! struct Person {
//!     #[cell(tag = ",rowkey")]
//!     id: String,
//!     #[cell(tag = "cf:name")]
//!     name: String,
//!     #[cell(tag = "cf:age")]
//!     age: i32,
//! }
//!
//! let row = Row::new("john")
//!     .with_cell(Cell::new("john", "cf", "name", "John"))
//!     .with_cell(Cell::new("john", "cf", "age", 16i32.to_be_bytes()));
//!
//! let mut person = Person::default();
//! decode_row(&row, &mut person)?;
//! assert_eq!(person, Person { id: "john".into(), name: "John".into(), age: 16 });
//!
//! let mutation = encode_columns("cf", Timestamp::now(), &person)?;
//! assert_eq!(mutation.row_key.as_deref(), Some(&b"john"[..]));
//! assert_eq!(mutation.get("cf", "age").map(|w| w.value.as_slice()), Some(&[0, 0, 0, 16][..]));
//! # Ok::<(), cellmap::CellMapError>(())
//! ```
//!
//! ## Safety and Error Handling
//!
//! * **No Panics:** no `unwrap()` or `panic!()` in the library (enforced by clippy lints).
//! * **Sparse rows:** a missing cell never fails a decode; the field keeps its value.
//! * **Comprehensive Errors:** all failures are a [`CellMapError`], annotated with the
//!   path of the field being processed.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// Lets the derive's `::cellmap::` paths resolve inside this crate's own tests.
extern crate self as cellmap;

pub mod api;
pub mod cell;
pub mod codec;
pub mod error;
pub mod record;
pub mod resolver;
pub mod tag;

mod decoder;
mod encoder;

pub use api::{CellMapper, CellMapperBuilder, MapperOptions};
pub use cell::{Cell, ColumnWrite, Mutation, Row, Timestamp};
pub use codec::{CellScalar, CellValue, LeafKind};
pub use error::{CellMapError, Result};
pub use record::{CellRecord, FieldAccess, FieldRef, FieldSlot, FieldView};
pub use tag::{parse_tag, parse_tag_with, qualifier_of, split_column, TagInfo};

// Re-export the derive macro so it is accessible as `cellmap::CellRecord`.
pub use cellmap_derive::CellRecord;

/// Populates `record` from a full row using default options.
///
/// See [`CellMapper::decode_row`].
pub fn decode_row<R: CellRecord>(row: &Row, record: &mut R) -> Result<()> {
    CellMapper::new().decode_row(row, record)
}

/// Populates `record` from a flat list of one row's cells using default options.
///
/// See [`CellMapper::decode_cells`].
pub fn decode_cells<R: CellRecord>(cells: &[Cell], record: &mut R) -> Result<()> {
    CellMapper::new().decode_cells(cells, record)
}

/// Logical qualifiers (last column-name segment) of each cell, in order.
///
/// See [`CellMapper::column_qualifiers`].
pub fn column_qualifiers(cells: &[Cell]) -> Vec<String> {
    CellMapper::new().column_qualifiers(cells)
}

/// Builds the writes of `record` for one column family using default options.
///
/// See [`CellMapper::encode_columns`].
pub fn encode_columns<R: CellRecord>(
    family: &str,
    timestamp: Timestamp,
    record: &R,
) -> Result<Mutation> {
    CellMapper::new().encode_columns(family, timestamp, record)
}
