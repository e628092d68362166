//! Mapping-tag grammar.
//!
//! A tag is a comma-separated token list attached to a record field:
//!
//! | Tag                            | Meaning                                         |
//! |--------------------------------|-------------------------------------------------|
//! | `"-"`                          | excluded from all mapping                       |
//! | `",rowkey"`                    | bound to the row key                            |
//! | `"family:qualifier"`           | bound to that column address                    |
//! | `"family:qualifier,omitempty"` | as above, omitted from writes when zero         |
//! | *(no tag)*                     | excluded                                        |
//!
//! Parsing is permissive: a column token without a delimiter is read as a bare
//! qualifier whose family is supplied by the caller (see [`TagInfo::family`]).

use serde::{Deserialize, Serialize};

use crate::error::{CellMapError, Result};

/// Delimiter between family and qualifier in a composite column name.
pub const COLUMN_DELIMITER: char = ':';

/// Token marking the row-key field.
pub const ROW_KEY_TOKEN: &str = "rowkey";

/// Token excluding a field from mapping.
pub const SKIP_TOKEN: &str = "-";

/// Token excluding zero values from writes.
pub const OMIT_EMPTY_TOKEN: &str = "omitempty";

/// The resolved meaning of one mapping tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// The field is bound to the row key.
    pub row_key: bool,
    /// Column token exactly as written, or empty.
    pub column: String,
    /// Omit the field from writes when it holds its zero value.
    pub omit_empty: bool,
    /// The field is excluded from mapping.
    pub skip: bool,
    family: Option<String>,
    qualifier: String,
}

impl TagInfo {
    /// Family part of the column address. `None` for a bare qualifier.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Logical qualifier: the last delimiter-separated segment of the column token.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Whether the field participates in mapping at all.
    pub fn is_mapped(&self) -> bool {
        !self.skip && (self.row_key || !self.column.is_empty())
    }

    /// Whether the column token lacks a proper `family:qualifier` shape.
    pub fn is_malformed(&self) -> bool {
        !self.skip
            && !self.row_key
            && !self.column.is_empty()
            && (self.family.as_deref().map_or(true, str::is_empty) || self.qualifier.is_empty())
    }
}

/// Parses a tag using the default `:` delimiter.
pub fn parse_tag(tag: &str) -> TagInfo {
    parse_tag_with(tag, COLUMN_DELIMITER)
}

/// Parses a tag, splitting the column token on `delimiter`.
pub fn parse_tag_with(tag: &str, delimiter: char) -> TagInfo {
    let mut info = TagInfo::default();
    if tag.trim().is_empty() {
        info.skip = true;
        return info;
    }

    let mut tokens = tag.split(',').map(str::trim);
    let first = tokens.next().unwrap_or_default();

    if first == SKIP_TOKEN {
        info.skip = true;
    } else if !first.is_empty() {
        info.column = first.to_string();
        let (family, qualifier) = split_column(first, delimiter);
        info.family = family.map(str::to_string);
        info.qualifier = qualifier.to_string();
    }

    for token in tokens {
        match token {
            SKIP_TOKEN => info.skip = true,
            OMIT_EMPTY_TOKEN => info.omit_empty = true,
            ROW_KEY_TOKEN if info.column.is_empty() => info.row_key = true,
            _ => {}
        }
    }

    info
}

/// Parses a tag and rejects column tokens that lack a family or qualifier.
pub(crate) fn parse_tag_strict(tag: &str, delimiter: char) -> Result<TagInfo> {
    let info = parse_tag_with(tag, delimiter);
    if info.is_malformed() {
        return Err(CellMapError::MalformedTag {
            tag: tag.to_string(),
            delimiter,
        });
    }
    Ok(info)
}

/// Splits a composite column name into `(family, qualifier)`.
///
/// The family is the first segment and the qualifier the last; a name without a
/// delimiter has no family.
pub fn split_column(column: &str, delimiter: char) -> (Option<&str>, &str) {
    match (column.split_once(delimiter), column.rsplit_once(delimiter)) {
        (Some((family, _)), Some((_, qualifier))) => (Some(family), qualifier),
        _ => (None, column),
    }
}

/// Extracts the logical qualifier (last segment) of a composite column name.
pub fn qualifier_of(column: &str, delimiter: char) -> &str {
    split_column(column, delimiter).1
}
