//! The main entry point: [`CellMapper`] and its [`MapperOptions`].
//!
//! The free functions at the crate root ([`decode_row`](crate::decode_row),
//! [`decode_cells`](crate::decode_cells), [`encode_columns`](crate::encode_columns))
//! use the default options. Build a mapper when you need a different delimiter or
//! strict tag checking:
//!
//! ```rust
//! use cellmap::{Cell, CellMapper, CellRecord, Row};
//!
//! #[derive(Default, CellRecord)]
//! struct User {
//!     #[cell(tag = ",rowkey")]
//!     id: String,
//!     #[cell(tag = "cf#name")]
//!     name: String,
//! }
//!
//! let mapper = CellMapper::builder().delimiter('#').strict_tags(true).build();
//! let row = Row::new("u1").with_cell(Cell {
//!     row: "u1".into(),
//!     column: "cf#name".into(),
//!     ..Cell::default()
//! });
//! let user: User = mapper.read_row(&row)?;
//! assert_eq!(user.id, "u1");
//! # Ok::<(), cellmap::CellMapError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Mutation, Row, Timestamp};
use crate::decoder;
use crate::encoder;
use crate::error::Result;
use crate::record::CellRecord;
use crate::tag::{self, TagInfo, COLUMN_DELIMITER};

/// Mapping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperOptions {
    /// Separator between family and qualifier in column names and tags.
    pub delimiter: char,
    /// Reject column tags that are not `family<delimiter>qualifier`.
    ///
    /// Off by default: a bare token is accepted as a qualifier whose family is
    /// supplied by the caller at encode time.
    pub strict_tags: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            delimiter: COLUMN_DELIMITER,
            strict_tags: false,
        }
    }
}

impl MapperOptions {
    /// Parses a raw tag under these options.
    pub fn parse_tag(&self, raw: &str) -> Result<TagInfo> {
        if self.strict_tags {
            tag::parse_tag_strict(raw, self.delimiter)
        } else {
            Ok(tag::parse_tag_with(raw, self.delimiter))
        }
    }
}

/// Converts between [`CellRecord`]s and wide-column rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMapper {
    options: MapperOptions,
}

impl CellMapper {
    /// A mapper with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper with explicit options.
    pub fn with_options(options: MapperOptions) -> Self {
        Self { options }
    }

    /// Starts a configuration builder.
    pub fn builder() -> CellMapperBuilder {
        CellMapperBuilder::default()
    }

    /// Active options.
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Populates `record` from a full row, walking nested records.
    ///
    /// Columns with no cell leave their field untouched. The first decode error
    /// is returned; fields decoded before it keep their new values.
    pub fn decode_row<R: CellRecord>(&self, row: &Row, record: &mut R) -> Result<()> {
        decoder::decode_row(&self.options, row, record)
    }

    /// Populates `record` from a flat list of one row's cells.
    ///
    /// Cells are matched by qualifier only, and nested records are not walked.
    pub fn decode_cells<R: CellRecord>(&self, cells: &[Cell], record: &mut R) -> Result<()> {
        decoder::decode_cells(&self.options, cells, record)
    }

    /// Decodes a full row into a fresh record.
    pub fn read_row<R: CellRecord + Default>(&self, row: &Row) -> Result<R> {
        let mut record = R::default();
        self.decode_row(row, &mut record)?;
        Ok(record)
    }

    /// Decodes a flat cell list into a fresh record.
    pub fn read_cells<R: CellRecord + Default>(&self, cells: &[Cell]) -> Result<R> {
        let mut record = R::default();
        self.decode_cells(cells, &mut record)?;
        Ok(record)
    }

    /// Logical qualifiers of each cell, split on the configured delimiter.
    pub fn column_qualifiers(&self, cells: &[Cell]) -> Vec<String> {
        decoder::column_qualifiers(&self.options, cells)
    }

    /// Builds the writes of `record` that target `family`.
    ///
    /// Fields tagged with a bare qualifier are written to `family`; fields whose
    /// tag names another family are left out.
    pub fn encode_columns<R: CellRecord>(
        &self,
        family: &str,
        timestamp: Timestamp,
        record: &R,
    ) -> Result<Mutation> {
        encoder::encode(&self.options, record, family, timestamp, encoder::Scope::Family)
    }

    /// Builds the writes of `record` for every family it maps to.
    ///
    /// Bare-qualifier tags fall back to `default_family`.
    pub fn encode_record<R: CellRecord>(
        &self,
        default_family: &str,
        timestamp: Timestamp,
        record: &R,
    ) -> Result<Mutation> {
        encoder::encode(&self.options, record, default_family, timestamp, encoder::Scope::All)
    }
}

/// Builder for [`CellMapper`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMapperBuilder {
    options: MapperOptions,
}

impl CellMapperBuilder {
    /// Sets the family / qualifier delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    /// Enables or disables strict tag checking.
    pub fn strict_tags(mut self, strict: bool) -> Self {
        self.options.strict_tags = strict;
        self
    }

    /// Finishes the mapper.
    pub fn build(self) -> CellMapper {
        CellMapper::with_options(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_options() {
        let mapper = CellMapper::builder().delimiter('/').strict_tags(true).build();
        assert_eq!(mapper.options().delimiter, '/');
        assert!(mapper.options().strict_tags);
        assert_eq!(*CellMapper::new().options(), MapperOptions::default());
    }

    #[test]
    fn options_parse_tags() {
        let strict = MapperOptions {
            strict_tags: true,
            ..MapperOptions::default()
        };
        assert!(strict.parse_tag("bare").is_err());
        assert!(MapperOptions::default().parse_tag("bare").is_ok());
    }
}
