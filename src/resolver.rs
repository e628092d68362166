//! Field resolution: flattens a record's descriptor table into mapped leaves.
//!
//! Nested records are expanded with an explicit worklist rather than call
//! recursion, so arbitrarily deep records never grow the native stack. Leaves are
//! produced in declaration order, each nested record's leaves in place of the
//! nested field itself.

use tracing::{debug, trace};

use crate::api::MapperOptions;
use crate::codec::CellValue;
use crate::error::Result;
use crate::record::{CellRecord, FieldAccess, FieldRef, FieldSlot, FieldView};
use crate::tag::TagInfo;

/// A mapped leaf field together with its parsed tag.
pub struct ResolvedField<L> {
    /// Dotted path from the root record (`address.street`).
    pub path: String,
    /// Parsed mapping tag.
    pub tag: TagInfo,
    /// Accessor of the leaf value.
    pub value: L,
}

impl<L> std::fmt::Debug for ResolvedField<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedField")
            .field("path", &self.path)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// How nested records are treated while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// Walk nested records into the parent's column namespace.
    Recursive,
    /// Only top-level leaves; nested records are skipped.
    TopLevel,
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn resolve_tag(path: &str, tag: Option<&str>, options: &MapperOptions) -> Result<Option<TagInfo>> {
    let Some(raw) = tag else {
        trace!(field = path, "untagged field skipped");
        return Ok(None);
    };
    let info = options.parse_tag(raw).map_err(|e| e.in_field(path))?;
    if !info.is_mapped() {
        trace!(field = path, tag = raw, "excluded field skipped");
        return Ok(None);
    }
    Ok(Some(info))
}

/// Resolves a record for reading (encoding). Always walks nested records.
pub fn resolve_fields<'a>(
    record: &'a dyn CellRecord,
    options: &MapperOptions,
) -> Result<Vec<ResolvedField<&'a dyn CellValue>>> {
    let mut resolved = Vec::new();
    let mut stack: Vec<(String, FieldRef<'a>)> = record
        .fields()
        .into_iter()
        .rev()
        .map(|field| (String::new(), field))
        .collect();

    while let Some((prefix, field)) = stack.pop() {
        let path = child_path(&prefix, field.name);
        match field.view {
            FieldView::Nested(nested) => {
                stack.extend(
                    nested
                        .fields()
                        .into_iter()
                        .rev()
                        .map(|child| (path.clone(), child)),
                );
            }
            FieldView::Leaf(value) => {
                if let Some(tag) = resolve_tag(&path, field.tag, options)? {
                    resolved.push(ResolvedField { path, tag, value });
                }
            }
        }
    }

    Ok(resolved)
}

/// Resolves a record for writing (decoding).
pub fn resolve_fields_mut<'a>(
    record: &'a mut dyn CellRecord,
    nesting: Nesting,
    options: &MapperOptions,
) -> Result<Vec<ResolvedField<&'a mut dyn CellValue>>> {
    let mut resolved = Vec::new();
    let mut stack: Vec<(String, FieldSlot<'a>)> = record
        .fields_mut()
        .into_iter()
        .rev()
        .map(|field| (String::new(), field))
        .collect();

    while let Some((prefix, field)) = stack.pop() {
        let path = child_path(&prefix, field.name);
        match field.access {
            FieldAccess::Nested(nested) => match nesting {
                Nesting::Recursive => {
                    stack.extend(
                        nested
                            .fields_mut()
                            .into_iter()
                            .rev()
                            .map(|child| (path.clone(), child)),
                    );
                }
                Nesting::TopLevel => {
                    debug!(field = %path, "nested record not walked in top-level resolution");
                }
            },
            FieldAccess::Leaf(value) => {
                if let Some(tag) = resolve_tag(&path, field.tag, options)? {
                    resolved.push(ResolvedField { path, tag, value });
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellMapError;
    use crate::CellRecord;

    #[derive(Default, CellRecord)]
    struct Inner {
        #[cell(tag = "b:deep")]
        deep: u8,
    }

    #[derive(Default, CellRecord)]
    struct Middle {
        #[cell(tag = "b:mid")]
        mid: u16,
        #[cell(nested)]
        inner: Inner,
    }

    #[derive(Default, CellRecord)]
    struct Outer {
        #[cell(tag = ",rowkey")]
        key: String,
        #[cell(nested)]
        middle: Middle,
        #[cell(tag = "a:top")]
        top: u32,
        #[allow(dead_code)]
        #[cell(tag = "a:gone,-")]
        gone: u32,
        #[cell(tag = ",omitempty")]
        columnless: u32,
        #[allow(dead_code)]
        untagged: u64,
    }

    #[test]
    fn flattens_in_declaration_order() {
        let record = Outer::default();
        let fields = resolve_fields(&record, &MapperOptions::default()).unwrap();
        let paths: Vec<_> = fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["key", "middle.mid", "middle.inner.deep", "top"]);
        assert!(fields[0].tag.row_key);
        assert_eq!(fields[2].tag.column, "b:deep");
    }

    #[test]
    fn top_level_skips_nested_records() {
        let mut record = Outer::default();
        let fields =
            resolve_fields_mut(&mut record, Nesting::TopLevel, &MapperOptions::default()).unwrap();
        let paths: Vec<_> = fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["key", "top"]);
    }

    #[derive(Default, CellRecord)]
    struct Loose {
        #[cell(tag = "name")]
        name: String,
    }

    #[test]
    fn strict_tags_reject_bare_qualifiers() {
        let mut record = Loose::default();
        assert!(resolve_fields_mut(&mut record, Nesting::Recursive, &MapperOptions::default()).is_ok());

        let strict = MapperOptions {
            strict_tags: true,
            ..MapperOptions::default()
        };
        let err = resolve_fields_mut(&mut record, Nesting::Recursive, &strict).unwrap_err();
        assert_eq!(err.field(), Some("name"));
        assert!(matches!(err.root_cause(), CellMapError::MalformedTag { .. }));
    }
}
