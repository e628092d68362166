//! # cellmap Derive Macros
//!
//! This crate provides the procedural macro for `cellmap`. It generates the
//! `CellRecord` descriptor table of a struct: one entry per field carrying a
//! `#[cell(...)]` attribute.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derives `CellRecord`.
///
/// Field attributes:
/// * `#[cell(tag = "family:qualifier")]`, `#[cell(tag = ",rowkey")]`,
///   `#[cell(tag = "family:qualifier,omitempty")]`: a leaf field. Its type must
///   implement `cellmap::CellValue`.
/// * `#[cell(tag = "-")]`: excluded, same as no attribute at all.
/// * `#[cell(nested)]`: a nested record whose type implements `cellmap::CellRecord`.
#[proc_macro_derive(CellRecord, attributes(cell))]
pub fn derive_cell_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data {
        Data::Struct(ds) => match ds.fields {
            Fields::Named(named) => named.named,
            Fields::Unit => Default::default(),
            Fields::Unnamed(_) => {
                return syn::Error::new(name.span(), "CellRecord requires named fields")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(name.span(), "CellRecord only supports structs")
                .to_compile_error()
                .into();
        }
    };

    let mut mapped = Vec::new();
    for field in fields {
        let mapping = match parse_attributes(&field.attrs) {
            Ok(m) => m,
            Err(e) => return e.to_compile_error().into(),
        };
        let Some(ident) = field.ident else {
            continue;
        };
        match mapping {
            Some(FieldMapping::Tag(tag)) if is_excluded(&tag) => {}
            Some(mapping) => mapped.push(MappedField { ident, mapping }),
            None => {}
        }
    }

    let refs = mapped.iter().map(|f| {
        let ident = &f.ident;
        let fname = ident.to_string();
        match &f.mapping {
            FieldMapping::Tag(tag) => quote! {
                ::cellmap::FieldRef::leaf(#fname, #tag, &self.#ident)
            },
            FieldMapping::Nested => quote! {
                ::cellmap::FieldRef::nested(#fname, &self.#ident)
            },
        }
    });

    let slots = mapped.iter().map(|f| {
        let ident = &f.ident;
        let fname = ident.to_string();
        match &f.mapping {
            FieldMapping::Tag(tag) => quote! {
                ::cellmap::FieldSlot::leaf(#fname, #tag, &mut self.#ident)
            },
            FieldMapping::Nested => quote! {
                ::cellmap::FieldSlot::nested(#fname, &mut self.#ident)
            },
        }
    });

    let expanded = quote! {
        impl #impl_generics ::cellmap::CellRecord for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::cellmap::FieldRef<'_>> {
                ::std::vec![#(#refs),*]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<::cellmap::FieldSlot<'_>> {
                ::std::vec![#(#slots),*]
            }
        }
    };

    TokenStream::from(expanded)
}

enum FieldMapping {
    Tag(String),
    Nested,
}

struct MappedField {
    ident: syn::Ident,
    mapping: FieldMapping,
}

/// A `-` token anywhere in the tag excludes the field.
fn is_excluded(tag: &str) -> bool {
    tag.split(',').any(|token| token.trim() == "-")
}

/// Parses `#[cell(...)]`. Returns `None` for fields without the attribute.
fn parse_attributes(attrs: &[Attribute]) -> syn::Result<Option<FieldMapping>> {
    let mut tag: Option<String> = None;
    let mut nested = false;

    for attr in attrs {
        if attr.path().is_ident("cell") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("nested") {
                    nested = true;
                    return Ok(());
                }

                if meta.path.is_ident("tag") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    tag = Some(s.value());
                    return Ok(());
                }

                Err(meta.error("Unknown cell attribute key. Supported: tag, nested"))
            })?;

            if nested && tag.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "a nested record takes no tag; its own fields carry the tags",
                ));
            }
        }
    }

    Ok(match (tag, nested) {
        (Some(tag), _) => Some(FieldMapping::Tag(tag)),
        (None, true) => Some(FieldMapping::Nested),
        (None, false) => None,
    })
}
