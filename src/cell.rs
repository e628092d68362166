//! Wide-column data model: cells, rows and write batches.
//!
//! These are the shapes exchanged with the storage engine client. The mapping
//! engine only reads [`Row`]/[`Cell`] and builds [`Mutation`]s; it never owns a
//! connection.

use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tag::{split_column, COLUMN_DELIMITER};

/// Cell timestamp in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Raw microsecond value.
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Drops sub-millisecond precision. Bigtable only accepts millisecond
    /// granularity on write.
    pub fn truncate_to_millis(self) -> Self {
        Self(self.0 - self.0.rem_euclid(1000))
    }

    /// Converts back to a UTC date-time, if representable.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_micros())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        Self::from(DateTime::<Utc>::from(value))
    }
}

/// One stored value at a row / column / timestamp coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Row key the cell belongs to.
    pub row: String,
    /// Composite column name, `family:qualifier`.
    pub column: String,
    /// Raw cell value.
    pub value: Vec<u8>,
    /// Cell timestamp.
    pub timestamp: Timestamp,
}

impl Cell {
    /// Builds a cell from its parts, composing the column name.
    pub fn new(
        row: impl Into<String>,
        family: &str,
        qualifier: &str,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self::with_delimiter(row, family, qualifier, value, COLUMN_DELIMITER)
    }

    /// Like [`Cell::new`], joining family and qualifier with `delimiter`.
    pub fn with_delimiter(
        row: impl Into<String>,
        family: &str,
        qualifier: &str,
        value: impl Into<Vec<u8>>,
        delimiter: char,
    ) -> Self {
        Self {
            row: row.into(),
            column: format!("{family}{delimiter}{qualifier}"),
            value: value.into(),
            timestamp: Timestamp::default(),
        }
    }

    /// Sets the cell timestamp.
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Family segment of the column name.
    pub fn family(&self) -> &str {
        self.family_with(COLUMN_DELIMITER)
    }

    /// Family segment of a column name split on `delimiter`.
    pub fn family_with(&self, delimiter: char) -> &str {
        split_column(&self.column, delimiter).0.unwrap_or_default()
    }

    /// Logical qualifier: the last segment of the column name.
    pub fn qualifier(&self) -> &str {
        self.qualifier_with(COLUMN_DELIMITER)
    }

    /// Last segment of a column name split on `delimiter`.
    pub fn qualifier_with(&self, delimiter: char) -> &str {
        split_column(&self.column, delimiter).1
    }
}

/// A row as returned by the storage engine: cells grouped by column family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Row key.
    pub key: String,
    /// Family name to the cells read for that family.
    pub families: BTreeMap<String, Vec<Cell>>,
}

impl Row {
    /// Creates an empty row.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            families: BTreeMap::new(),
        }
    }

    /// Groups a flat cell list by family. The key is taken from the first cell.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self::from_cells_with(cells, COLUMN_DELIMITER)
    }

    /// Like [`Row::from_cells`] for column names split on `delimiter`.
    pub fn from_cells_with(cells: impl IntoIterator<Item = Cell>, delimiter: char) -> Self {
        let mut row = Self::default();
        for cell in cells {
            if row.families.is_empty() {
                row.key = cell.row.clone();
            }
            row.push_with(cell, delimiter);
        }
        row
    }

    /// Appends a cell under its family.
    pub fn push(&mut self, cell: Cell) {
        self.push_with(cell, COLUMN_DELIMITER);
    }

    /// Appends a cell under its family, splitting the column name on `delimiter`.
    pub fn push_with(&mut self, cell: Cell, delimiter: char) {
        self.families
            .entry(cell.family_with(delimiter).to_string())
            .or_default()
            .push(cell);
    }

    /// Builder-style [`Row::push`].
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.push(cell);
        self
    }

    /// Cells of one family.
    pub fn family(&self, name: &str) -> &[Cell] {
        self.families.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every cell, family by family.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.families.values().flatten()
    }

    /// Whether the row holds no cells.
    pub fn is_empty(&self) -> bool {
        self.families.values().all(Vec::is_empty)
    }
}

/// A single column write produced by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWrite {
    /// Target column family.
    pub family: String,
    /// Column qualifier.
    pub qualifier: String,
    /// Encoded value.
    pub value: Vec<u8>,
    /// Write timestamp.
    pub timestamp: Timestamp,
}

impl ColumnWrite {
    /// Composite column name of the write.
    pub fn column(&self) -> String {
        self.column_with(COLUMN_DELIMITER)
    }

    /// Composite column name joined with `delimiter`.
    pub fn column_with(&self, delimiter: char) -> String {
        format!("{}{delimiter}{}", self.family, self.qualifier)
    }
}

/// The set of writes for one row, ready to hand to the storage client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Encoded value of the record's row-key field, if it has one.
    pub row_key: Option<Vec<u8>>,
    /// Column writes in field declaration order.
    pub writes: Vec<ColumnWrite>,
    /// Family / qualifier delimiter the writes were encoded under.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    COLUMN_DELIMITER
}

impl Default for Mutation {
    fn default() -> Self {
        Self {
            row_key: None,
            writes: Vec::new(),
            delimiter: COLUMN_DELIMITER,
        }
    }
}

impl Mutation {
    /// Number of column writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Looks up the write for a family / qualifier pair.
    pub fn get(&self, family: &str, qualifier: &str) -> Option<&ColumnWrite> {
        self.writes
            .iter()
            .find(|w| w.family == family && w.qualifier == qualifier)
    }

    /// Groups writes by family, since the engine applies one family per call.
    pub fn by_family(&self) -> BTreeMap<&str, Vec<&ColumnWrite>> {
        let mut grouped: BTreeMap<&str, Vec<&ColumnWrite>> = BTreeMap::new();
        for write in &self.writes {
            grouped.entry(write.family.as_str()).or_default().push(write);
        }
        grouped
    }

    /// Converts the writes into the cells a subsequent read of `row` would return.
    ///
    /// Column names are joined with the delimiter the mutation was encoded under.
    pub fn into_cells(self, row: &str) -> Vec<Cell> {
        let delimiter = self.delimiter;
        self.writes
            .into_iter()
            .map(|w| Cell {
                row: row.to_string(),
                column: w.column_with(delimiter),
                value: w.value,
                timestamp: w.timestamp,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_column_parts() {
        let cell = Cell::new("john", "info", "age", vec![0u8, 0, 0, 16]);
        assert_eq!(cell.column, "info:age");
        assert_eq!(cell.family(), "info");
        assert_eq!(cell.qualifier(), "age");
    }

    #[test]
    fn row_groups_cells_by_family() {
        let row = Row::from_cells(vec![
            Cell::new("john", "info", "name", "John"),
            Cell::new("john", "address", "street", "Rafless st."),
            Cell::new("john", "info", "age", vec![16u8]),
        ]);
        assert_eq!(row.key, "john");
        assert_eq!(row.family("info").len(), 2);
        assert_eq!(row.family("address").len(), 1);
        assert!(row.family("missing").is_empty());
        assert_eq!(row.cells().count(), 3);
    }

    #[test]
    fn timestamp_truncation() {
        assert_eq!(Timestamp(1_234_567).truncate_to_millis(), Timestamp(1_234_000));
        assert_eq!(Timestamp(-1).truncate_to_millis(), Timestamp(-1000));
        let now = Timestamp::now();
        assert!(now.to_datetime().is_some());
    }

    #[test]
    fn mutation_round_trips_to_cells() {
        let mutation = Mutation {
            row_key: Some(b"k".to_vec()),
            writes: vec![ColumnWrite {
                family: "cf".into(),
                qualifier: "q".into(),
                value: vec![1],
                timestamp: Timestamp(5),
            }],
            ..Mutation::default()
        };
        assert_eq!(mutation.by_family()["cf"].len(), 1);
        let cells = mutation.into_cells("k");
        assert_eq!(cells[0].column, "cf:q");
        assert_eq!(cells[0].timestamp, Timestamp(5));
    }

    #[test]
    fn custom_delimiter_splits_and_joins_columns() {
        let cell = Cell::with_delimiter("k", "cf", "name", "Ada", '#');
        assert_eq!(cell.column, "cf#name");
        assert_eq!(cell.family_with('#'), "cf");
        assert_eq!(cell.qualifier_with('#'), "name");
        assert_eq!(cell.family(), "");

        let row = Row::from_cells_with(vec![cell], '#');
        assert_eq!(row.family("cf").len(), 1);

        let mutation = Mutation {
            writes: vec![ColumnWrite {
                family: "cf".into(),
                qualifier: "name".into(),
                value: b"Ada".to_vec(),
                timestamp: Timestamp(1),
            }],
            delimiter: '#',
            ..Mutation::default()
        };
        assert_eq!(mutation.into_cells("k")[0].column, "cf#name");
    }
}
