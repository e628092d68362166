//! Defines the `CellRecord` trait: a record's field descriptor table.
//!
//! Instead of inspecting types at runtime, every mappable record exposes a list of
//! field descriptors built at compile time by `#[derive(CellRecord)]`. Each
//! descriptor pairs the field's name and raw mapping tag with a borrowed accessor
//! that is either a leaf value (`dyn CellValue`) or a nested record
//! (`dyn CellRecord`).
//!
//! The derive only lists fields that carry a `#[cell(...)]` attribute; untagged
//! fields and fields tagged `"-"` never appear in the table.
//!
//! ```rust
//! use cellmap::CellRecord;
//!
//! #[derive(Default, CellRecord)]
//! struct Address {
//!     #[cell(tag = "address:street")]
//!     street: String,
//! }
//!
//! #[derive(Default, CellRecord)]
//! struct Person {
//!     #[cell(tag = ",rowkey")]
//!     id: String,
//!     #[cell(tag = "info:age")]
//!     age: i32,
//!     #[cell(nested)]
//!     address: Address,
//!     scratch: Vec<String>,
//! }
//!
//! let person = Person::default();
//! let names: Vec<_> = person.fields().iter().map(|f| f.name).collect();
//! assert_eq!(names, ["id", "age", "address"]);
//! ```

use crate::codec::CellValue;

/// A record whose fields can be mapped onto wide-column cells.
///
/// Usually derived. Hand-written impls must return disjoint borrows of the
/// record's own fields, in declaration order.
pub trait CellRecord {
    /// Read-only descriptors, used by the encoder.
    fn fields(&self) -> Vec<FieldRef<'_>>;

    /// Mutable descriptors, used by the decoders.
    fn fields_mut(&mut self) -> Vec<FieldSlot<'_>>;
}

/// Read-only accessor of one field.
pub enum FieldView<'a> {
    /// A leaf value.
    Leaf(&'a dyn CellValue),
    /// A nested record flattened into the parent's column namespace.
    Nested(&'a dyn CellRecord),
}

/// Mutable accessor of one field.
pub enum FieldAccess<'a> {
    /// A leaf value.
    Leaf(&'a mut dyn CellValue),
    /// A nested record flattened into the parent's column namespace.
    Nested(&'a mut dyn CellRecord),
}

/// Read-only field descriptor.
pub struct FieldRef<'a> {
    /// Field identifier.
    pub name: &'static str,
    /// Raw mapping tag. Always `None` for nested records.
    pub tag: Option<&'static str>,
    /// Accessor.
    pub view: FieldView<'a>,
}

/// Mutable field descriptor.
pub struct FieldSlot<'a> {
    /// Field identifier.
    pub name: &'static str,
    /// Raw mapping tag. Always `None` for nested records.
    pub tag: Option<&'static str>,
    /// Accessor.
    pub access: FieldAccess<'a>,
}

impl<'a> FieldRef<'a> {
    /// Descriptor of a tagged leaf.
    pub fn leaf(name: &'static str, tag: &'static str, value: &'a dyn CellValue) -> Self {
        Self {
            name,
            tag: Some(tag),
            view: FieldView::Leaf(value),
        }
    }

    /// Descriptor of a nested record.
    pub fn nested(name: &'static str, record: &'a dyn CellRecord) -> Self {
        Self {
            name,
            tag: None,
            view: FieldView::Nested(record),
        }
    }
}

impl<'a> FieldSlot<'a> {
    /// Descriptor of a tagged leaf.
    pub fn leaf(name: &'static str, tag: &'static str, value: &'a mut dyn CellValue) -> Self {
        Self {
            name,
            tag: Some(tag),
            access: FieldAccess::Leaf(value),
        }
    }

    /// Descriptor of a nested record.
    pub fn nested(name: &'static str, record: &'a mut dyn CellRecord) -> Self {
        Self {
            name,
            tag: None,
            access: FieldAccess::Nested(record),
        }
    }
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.view {
            FieldView::Leaf(value) => value.kind().to_string(),
            FieldView::Nested(_) => "record".to_string(),
        };
        f.debug_struct("FieldRef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("kind", &kind)
            .finish()
    }
}

impl std::fmt::Debug for FieldSlot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.access {
            FieldAccess::Leaf(value) => value.kind().to_string(),
            FieldAccess::Nested(_) => "record".to_string(),
        };
        f.debug_struct("FieldSlot")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("kind", &kind)
            .finish()
    }
}
