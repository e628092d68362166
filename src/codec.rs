//! Leaf value codec.
//!
//! Converts a single field value to and from the flat byte cell stored by the
//! wide-column engine:
//!
//! * fixed-width integers and floats: big-endian, exactly the declared width;
//! * `isize` / `usize`: eight bytes, like `i64` / `u64`;
//! * `bool`: one byte, `1` on write, any non-zero byte reads as `true`;
//! * `String` and `Vec<u8>`: the bytes verbatim;
//! * `Option<T>`: the inner encoding, with `None` meaning "no cell".
//!
//! Numeric cells go through `bincode` with a big-endian, fixed-int
//! configuration so the on-cell layout matches what other Bigtable clients write
//! with their native big-endian encoders.

use std::fmt;

use bincode::config::{BigEndian, Configuration, Fixint};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cell::Cell;
use crate::error::{CellMapError, Result};

/// Semantic kind of a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LeafKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `isize`, stored as eight bytes
    Isize,
    /// `usize`, stored as eight bytes
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// `Vec<u8>`
    Bytes,
    /// A type with no codec rule, named for diagnostics.
    Unsupported(&'static str),
}

impl LeafKind {
    /// Exact cell width for fixed-width kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 | Self::Isize | Self::Usize => Some(8),
            Self::String | Self::Bytes | Self::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Isize => "isize",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Unsupported(name) => name,
        };
        f.write_str(name)
    }
}

/// A concrete, non-optional leaf type with a fixed cell encoding.
pub trait CellScalar: Sized {
    /// Semantic kind of the type.
    const KIND: LeafKind;

    /// Encodes the value into its cell bytes.
    fn to_cell(&self) -> Result<Vec<u8>>;

    /// Decodes a value from cell bytes.
    fn from_cell(bytes: &[u8]) -> Result<Self>;

    /// Whether the value equals the type's zero value.
    fn is_zero(&self) -> bool;
}

/// Type-erased accessor over a record's leaf field.
///
/// This is the object-safe face of the codec: the derived descriptor table hands
/// out `&dyn CellValue` / `&mut dyn CellValue` for every tagged field.
pub trait CellValue {
    /// Semantic kind of the underlying value (the inner kind for optionals).
    fn kind(&self) -> LeafKind;

    /// Whether the slot is an optional wrapper.
    fn is_optional(&self) -> bool {
        false
    }

    /// Encodes the current value. `None` means there is nothing to write.
    fn encode_cell(&self) -> Result<Option<Vec<u8>>>;

    /// Overwrites the slot with the value decoded from `bytes`.
    fn decode_cell(&mut self, bytes: &[u8]) -> Result<()>;

    /// Whether the slot holds its zero / empty value.
    fn is_zero(&self) -> bool;
}

type WireConfig = Configuration<BigEndian, Fixint>;

fn wire_config() -> WireConfig {
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

fn encode_fixed<T: Serialize>(value: &T, kind: LeafKind) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, wire_config()).map_err(|e| CellMapError::InvalidValue {
        kind,
        reason: e.to_string(),
    })
}

fn decode_fixed<T: DeserializeOwned>(bytes: &[u8], kind: LeafKind) -> Result<T> {
    let expected = kind.fixed_width().unwrap_or_default();
    if bytes.len() != expected {
        return Err(CellMapError::MalformedBinary {
            kind,
            expected,
            actual: bytes.len(),
        });
    }
    bincode::serde::decode_from_slice(bytes, wire_config())
        .map(|(value, _)| value)
        .map_err(|e| CellMapError::InvalidValue {
            kind,
            reason: e.to_string(),
        })
}

macro_rules! impl_fixed_scalar {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl CellScalar for $t {
                const KIND: LeafKind = LeafKind::$kind;

                fn to_cell(&self) -> Result<Vec<u8>> {
                    encode_fixed(self, Self::KIND)
                }

                fn from_cell(bytes: &[u8]) -> Result<Self> {
                    decode_fixed(bytes, Self::KIND)
                }

                fn is_zero(&self) -> bool {
                    *self == <$t>::default()
                }
            }
        )*
    };
}

impl_fixed_scalar!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

// Pointer-width integers travel as their 64-bit counterparts.
macro_rules! impl_wide_scalar {
    ($($t:ty => $wide:ty, $kind:ident),* $(,)?) => {
        $(
            impl CellScalar for $t {
                const KIND: LeafKind = LeafKind::$kind;

                fn to_cell(&self) -> Result<Vec<u8>> {
                    let wide = <$wide>::try_from(*self).map_err(|e| CellMapError::InvalidValue {
                        kind: Self::KIND,
                        reason: e.to_string(),
                    })?;
                    encode_fixed(&wide, Self::KIND)
                }

                fn from_cell(bytes: &[u8]) -> Result<Self> {
                    let wide: $wide = decode_fixed(bytes, Self::KIND)?;
                    <$t>::try_from(wide).map_err(|e| CellMapError::InvalidValue {
                        kind: Self::KIND,
                        reason: e.to_string(),
                    })
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_wide_scalar!(isize => i64, Isize, usize => u64, Usize);

impl CellScalar for bool {
    const KIND: LeafKind = LeafKind::Bool;

    fn to_cell(&self) -> Result<Vec<u8>> {
        Ok(vec![u8::from(*self)])
    }

    // Some writers store `true` as 0xFF.
    fn from_cell(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [byte] => Ok(*byte != 0),
            _ => Err(CellMapError::MalformedBinary {
                kind: Self::KIND,
                expected: 1,
                actual: bytes.len(),
            }),
        }
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl CellScalar for String {
    const KIND: LeafKind = LeafKind::String;

    fn to_cell(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    // No charset validation: invalid sequences are replaced rather than rejected.
    fn from_cell(bytes: &[u8]) -> Result<Self> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl CellScalar for Vec<u8> {
    const KIND: LeafKind = LeafKind::Bytes;

    fn to_cell(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn from_cell(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! impl_cell_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl CellValue for $t {
                fn kind(&self) -> LeafKind {
                    <$t as CellScalar>::KIND
                }

                fn encode_cell(&self) -> Result<Option<Vec<u8>>> {
                    self.to_cell().map(Some)
                }

                fn decode_cell(&mut self, bytes: &[u8]) -> Result<()> {
                    *self = <$t as CellScalar>::from_cell(bytes)?;
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    CellScalar::is_zero(self)
                }
            }

            impl CellValue for Option<$t> {
                fn kind(&self) -> LeafKind {
                    <$t as CellScalar>::KIND
                }

                fn is_optional(&self) -> bool {
                    true
                }

                fn encode_cell(&self) -> Result<Option<Vec<u8>>> {
                    self.as_ref().map(CellScalar::to_cell).transpose()
                }

                // The slot only becomes `Some` once a value decodes successfully.
                fn decode_cell(&mut self, bytes: &[u8]) -> Result<()> {
                    *self = Some(<$t as CellScalar>::from_cell(bytes)?);
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    self.is_none()
                }
            }
        )*
    };
}

impl_cell_value!(
    bool, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64, String, Vec<u8>
);

// A raw engine cell embedded in a record has no byte representation of its own.
impl CellValue for Cell {
    fn kind(&self) -> LeafKind {
        LeafKind::Unsupported("Cell")
    }

    fn encode_cell(&self) -> Result<Option<Vec<u8>>> {
        Err(CellMapError::UnsupportedKind { kind: self.kind() })
    }

    fn decode_cell(&mut self, _bytes: &[u8]) -> Result<()> {
        Err(CellMapError::UnsupportedKind { kind: self.kind() })
    }

    fn is_zero(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian_fixed_width() {
        assert_eq!(16i32.to_cell().unwrap(), vec![0, 0, 0, 16]);
        assert_eq!(258u16.to_cell().unwrap(), vec![1, 2]);
        assert_eq!((-1i64).to_cell().unwrap(), vec![0xFF; 8]);
        assert_eq!(7u8.to_cell().unwrap(), vec![7]);
    }

    #[test]
    fn floats_are_big_endian_ieee() {
        assert_eq!(123f32.to_cell().unwrap(), 123f32.to_be_bytes().to_vec());
        assert_eq!(f64::from_cell(&1.5f64.to_be_bytes()).unwrap(), 1.5);
    }

    #[test]
    fn width_mismatch_is_malformed() {
        let err = i64::from_cell(&[0, 0, 0, 16]).unwrap_err();
        assert_eq!(
            err,
            CellMapError::MalformedBinary {
                kind: LeafKind::I64,
                expected: 8,
                actual: 4
            }
        );
        assert!(i32::from_cell(&[0, 0, 0, 0, 16]).is_err());
        assert!(u16::from_cell(&[]).is_err());
    }

    #[test]
    fn bool_uses_single_byte() {
        assert_eq!(true.to_cell().unwrap(), vec![1]);
        assert_eq!(false.to_cell().unwrap(), vec![0]);
        assert!(bool::from_cell(&[1]).unwrap());
        assert!(!bool::from_cell(&[0]).unwrap());
        assert!(bool::from_cell(&[0xFF]).unwrap());
        assert!(bool::from_cell(&[2]).unwrap());
        assert!(matches!(
            bool::from_cell(&[0, 1]),
            Err(CellMapError::MalformedBinary { .. })
        ));
        assert!(bool::from_cell(&[]).is_err());
    }

    #[test]
    fn pointer_width_integers_use_eight_bytes() {
        assert_eq!(123isize.to_cell().unwrap(), 123i64.to_be_bytes().to_vec());
        assert_eq!(usize::from_cell(&123u64.to_be_bytes()).unwrap(), 123);
        assert_eq!(isize::from_cell(&(-5i64).to_be_bytes()).unwrap(), -5);
        assert_eq!(
            usize::from_cell(&[0, 0, 0, 123]).unwrap_err(),
            CellMapError::MalformedBinary {
                kind: LeafKind::Usize,
                expected: 8,
                actual: 4
            }
        );
    }

    #[test]
    fn text_and_bytes_are_verbatim() {
        assert_eq!(String::from_cell(b"hoge").unwrap(), "hoge");
        assert_eq!(Vec::<u8>::from_cell(&[0, 255]).unwrap(), vec![0, 255]);
        assert_eq!("John".to_string().to_cell().unwrap(), b"John".to_vec());
    }

    #[test]
    fn optional_slot_fills_on_decode() {
        let mut slot: Option<u32> = None;
        assert!(slot.is_zero());
        assert_eq!(slot.encode_cell().unwrap(), None);

        slot.decode_cell(&[0, 0, 1, 0]).unwrap();
        assert_eq!(slot, Some(256));
        assert!(!CellValue::is_zero(&slot));
        assert_eq!(slot.kind(), LeafKind::U32);
        assert!(slot.is_optional());
    }

    #[test]
    fn failed_optional_decode_leaves_slot_empty() {
        let mut slot: Option<i16> = None;
        assert!(slot.decode_cell(&[1]).is_err());
        assert_eq!(slot, None);
    }

    #[test]
    fn zero_values() {
        assert!(CellScalar::is_zero(&0i32));
        assert!(CellScalar::is_zero(&0.0f64));
        assert!(CellScalar::is_zero(&String::new()));
        assert!(!CellScalar::is_zero(&true));
    }

    #[test]
    fn raw_cell_is_unsupported() {
        let mut cell = Cell::default();
        assert!(matches!(
            cell.decode_cell(b"x"),
            Err(CellMapError::UnsupportedKind { .. })
        ));
        assert!(cell.encode_cell().is_err());
    }
}
