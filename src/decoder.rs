//! The read side: populates records from row cells.
//!
//! Two entry points with deliberately different reach:
//!
//! * [`decode_row`] builds a `column → cell` index over every family of a
//!   [`Row`] and walks nested records, so a record can span several families.
//! * [`decode_cells`] takes a flat cell list, matches on the qualifier alone and
//!   only looks at the record's top-level fields.
//!
//! In both paths a missing cell is not an error: the field keeps whatever value
//! it had.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::api::MapperOptions;
use crate::cell::{Cell, Row};
use crate::error::Result;
use crate::record::CellRecord;
use crate::resolver::{resolve_fields_mut, Nesting};
use crate::tag::qualifier_of;

pub(crate) fn decode_row(
    options: &MapperOptions,
    row: &Row,
    record: &mut dyn CellRecord,
) -> Result<()> {
    // Later cells overwrite earlier ones for the same column.
    let lookup: HashMap<&str, &Cell> = row
        .cells()
        .map(|cell| (cell.column.as_str(), cell))
        .collect();

    let fields = resolve_fields_mut(record, Nesting::Recursive, options)?;
    let mut decoded = 0usize;

    for field in fields {
        if field.tag.row_key {
            field
                .value
                .decode_cell(row.key.as_bytes())
                .map_err(|e| e.in_field(&field.path))?;
            decoded += 1;
            continue;
        }

        let Some(cell) = lookup.get(field.tag.column.as_str()) else {
            trace!(field = %field.path, column = %field.tag.column, "no cell for column");
            continue;
        };
        field
            .value
            .decode_cell(&cell.value)
            .map_err(|e| e.in_field(&field.path))?;
        decoded += 1;
    }

    debug!(row = %row.key, cells = lookup.len(), decoded, "decoded row");
    Ok(())
}

pub(crate) fn decode_cells(
    options: &MapperOptions,
    cells: &[Cell],
    record: &mut dyn CellRecord,
) -> Result<()> {
    // All cells are assumed to share one row.
    let Some(first) = cells.first() else {
        return Ok(());
    };

    let fields = resolve_fields_mut(record, Nesting::TopLevel, options)?;
    let mut decoded = 0usize;

    for field in fields {
        if field.tag.row_key {
            field
                .value
                .decode_cell(first.row.as_bytes())
                .map_err(|e| e.in_field(&field.path))?;
            decoded += 1;
            continue;
        }

        for cell in cells {
            if qualifier_of(&cell.column, options.delimiter) != field.tag.qualifier() {
                continue;
            }
            field
                .value
                .decode_cell(&cell.value)
                .map_err(|e| e.in_field(&field.path))?;
            decoded += 1;
        }
    }

    debug!(row = %first.row, cells = cells.len(), decoded, "decoded cell list");
    Ok(())
}

pub(crate) fn column_qualifiers(options: &MapperOptions, cells: &[Cell]) -> Vec<String> {
    cells
        .iter()
        .map(|cell| cell.qualifier_with(options.delimiter).to_string())
        .collect()
}
