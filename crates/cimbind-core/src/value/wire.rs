use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// WireType
///
/// Native type tag of a member in the remote store's schema.
/// Array-ness is tracked separately on the schema entry.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum WireType {
    Boolean,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    Sint64,
    Uint64,
    Real32,
    Real64,
    Char16,
    String,
    /// Timestamp or interval encoded as a DMTF string.
    DateTime,
    /// Path string identifying another record.
    Reference,
    /// Embedded object; opaque to the binding layer.
    Object,
}

impl WireType {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Sint8
                | Self::Uint8
                | Self::Sint16
                | Self::Uint16
                | Self::Sint32
                | Self::Uint32
                | Self::Sint64
                | Self::Uint64
        )
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Sint8 | Self::Sint16 | Self::Sint32 | Self::Sint64)
    }

    #[must_use]
    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real32 | Self::Real64)
    }

    /// Types whose wire form is a plain string.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::DateTime | Self::Reference)
    }

    /// Inclusive integer bounds, for integer tags only.
    const fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::Sint8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Uint8 => Some((0, u8::MAX as i128)),
            Self::Sint16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Uint16 => Some((0, u16::MAX as i128)),
            Self::Sint32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Sint64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

///
/// WireValue
///
/// The store's native representation of a member value.
/// `Null` stands for a member that exists but holds no value.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum WireValue {
    Null,
    Boolean(bool),
    Sint8(i8),
    Uint8(u8),
    Sint16(i16),
    Uint16(u16),
    Sint32(i32),
    Uint32(u32),
    Sint64(i64),
    Uint64(u64),
    Real32(f32),
    Real64(f64),
    Char16(char),
    String(String),
    DateTime(String),
    Reference(String),
    Array(Vec<Self>),
}

impl WireValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar type tag; `None` for `Null` and arrays.
    #[must_use]
    pub const fn tag(&self) -> Option<WireType> {
        let tag = match self {
            Self::Null | Self::Array(_) => return None,
            Self::Boolean(_) => WireType::Boolean,
            Self::Sint8(_) => WireType::Sint8,
            Self::Uint8(_) => WireType::Uint8,
            Self::Sint16(_) => WireType::Sint16,
            Self::Uint16(_) => WireType::Uint16,
            Self::Sint32(_) => WireType::Sint32,
            Self::Uint32(_) => WireType::Uint32,
            Self::Sint64(_) => WireType::Sint64,
            Self::Uint64(_) => WireType::Uint64,
            Self::Real32(_) => WireType::Real32,
            Self::Real64(_) => WireType::Real64,
            Self::Char16(_) => WireType::Char16,
            Self::String(_) => WireType::String,
            Self::DateTime(_) => WireType::DateTime,
            Self::Reference(_) => WireType::Reference,
        };

        Some(tag)
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Null => "Null".to_string(),
            Self::Array(_) => "Array".to_string(),
            other => other.tag().map(|t| t.to_string()).unwrap_or_default(),
        }
    }

    /// Integer payload widened to `i128`, if this is an integer.
    #[must_use]
    pub const fn as_i128(&self) -> Option<i128> {
        let v = match *self {
            Self::Sint8(v) => v as i128,
            Self::Uint8(v) => v as i128,
            Self::Sint16(v) => v as i128,
            Self::Uint16(v) => v as i128,
            Self::Sint32(v) => v as i128,
            Self::Uint32(v) => v as i128,
            Self::Sint64(v) => v as i128,
            Self::Uint64(v) => v as i128,
            _ => return None,
        };

        Some(v)
    }

    /// Textual payload for string-shaped values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::DateTime(s) | Self::Reference(s) => Some(s),
            _ => None,
        }
    }

    /// Build an integer value of the given tag, if `v` fits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn integer(target: WireType, v: i128) -> Option<Self> {
        let (min, max) = target.integer_bounds()?;
        if v < min || v > max {
            return None;
        }

        let value = match target {
            WireType::Sint8 => Self::Sint8(v as i8),
            WireType::Uint8 => Self::Uint8(v as u8),
            WireType::Sint16 => Self::Sint16(v as i16),
            WireType::Uint16 => Self::Uint16(v as u16),
            WireType::Sint32 => Self::Sint32(v as i32),
            WireType::Uint32 => Self::Uint32(v as u32),
            WireType::Sint64 => Self::Sint64(v as i64),
            WireType::Uint64 => Self::Uint64(v as u64),
            _ => return None,
        };

        Some(value)
    }

    ///
    /// coerce
    ///
    /// Unbox this value as `target`.
    ///
    /// An exact tag match always succeeds. Unless `strict` is set, lossless
    /// conversions are accepted too: integer width changes that keep the
    /// value, integers exactly representable as reals, real widening, and
    /// re-tagging between the string-shaped types. Everything else is a
    /// cast error. Arrays are coerced element-wise.
    ///
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::float_cmp
    )]
    pub fn coerce(self, target: WireType, strict: bool) -> Result<Self, CastError> {
        if let Self::Array(items) = self {
            return items
                .into_iter()
                .map(|item| item.coerce(target, strict))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array);
        }

        let Some(tag) = self.tag() else {
            return Ok(Self::Null);
        };
        if tag == target {
            return Ok(self);
        }

        let err = CastError::new(tag, target);
        if strict {
            return Err(err);
        }

        if let Some(v) = self.as_i128() {
            return match target {
                t if t.is_integer() => Self::integer(t, v).ok_or(err),
                WireType::Real64 if v.unsigned_abs() <= F64_EXACT => Ok(Self::Real64(v as f64)),
                WireType::Real32 if v.unsigned_abs() <= F32_EXACT => Ok(Self::Real32(v as f32)),
                WireType::Char16 => u32::try_from(v)
                    .ok()
                    .filter(|code| *code <= u32::from(u16::MAX))
                    .and_then(char::from_u32)
                    .map(Self::Char16)
                    .ok_or(err),
                _ => Err(err),
            };
        }

        match (self, target) {
            (Self::Real32(v), WireType::Real64) => Ok(Self::Real64(f64::from(v))),
            (Self::Real64(v), WireType::Real32) if f64::from(v as f32) == v => {
                Ok(Self::Real32(v as f32))
            }
            (Self::Char16(c), t) if t.is_integer() => {
                Self::integer(t, i128::from(u32::from(c))).ok_or(err)
            }
            (Self::String(s) | Self::DateTime(s) | Self::Reference(s), t) => match t {
                WireType::String => Ok(Self::String(s)),
                WireType::DateTime => Ok(Self::DateTime(s)),
                WireType::Reference => Ok(Self::Reference(s)),
                _ => Err(err),
            },
            _ => Err(err),
        }
    }
}

/// Largest integer magnitudes exactly representable by the real types.
const F64_EXACT: u128 = 1u128 << 53;
const F32_EXACT: u128 = 1u128 << 24;

///
/// CastError
/// A wire value could not be unboxed as the requested type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("cannot convert {from} to {to}")]
pub struct CastError {
    pub from: WireType,
    pub to: WireType,
}

impl CastError {
    #[must_use]
    pub const fn new(from: WireType, to: WireType) -> Self {
        Self { from, to }
    }
}
