//! The write side: turns a populated record into column writes.

use tracing::{debug, trace};

use crate::api::MapperOptions;
use crate::cell::{ColumnWrite, Mutation, Timestamp};
use crate::error::Result;
use crate::record::CellRecord;
use crate::resolver::resolve_fields;

/// Which writes an encode pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Only writes landing in the requested family.
    Family,
    /// Every family the record maps to.
    All,
}

pub(crate) fn encode(
    options: &MapperOptions,
    record: &dyn CellRecord,
    family: &str,
    timestamp: Timestamp,
    scope: Scope,
) -> Result<Mutation> {
    let mut mutation = Mutation {
        delimiter: options.delimiter,
        ..Mutation::default()
    };

    for field in resolve_fields(record, options)? {
        if field.tag.row_key {
            mutation.row_key = field
                .value
                .encode_cell()
                .map_err(|e| e.in_field(&field.path))?;
            continue;
        }

        let target = field.tag.family().unwrap_or(family);
        if scope == Scope::Family && target != family {
            trace!(field = %field.path, family = target, "field belongs to another family");
            continue;
        }
        if field.tag.omit_empty && field.value.is_zero() {
            trace!(field = %field.path, "empty value omitted");
            continue;
        }

        // An unset optional has no cell to write.
        let Some(value) = field
            .value
            .encode_cell()
            .map_err(|e| e.in_field(&field.path))?
        else {
            continue;
        };

        mutation.writes.push(ColumnWrite {
            family: target.to_string(),
            qualifier: field.tag.qualifier().to_string(),
            value,
            timestamp,
        });
    }

    debug!(family, writes = mutation.writes.len(), "encoded record");
    Ok(mutation)
}
