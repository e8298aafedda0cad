pub mod dmtf;
mod wire;


use crate::proxy::Proxy;
use chrono::{DateTime, FixedOffset};

// re-exports
pub use wire::{CastError, WireType, WireValue};

///
/// Value
///
/// Logical value as seen by declarations, after wire conversions.
///
/// Null      → the member holds no value (optional or reference types).
/// Entity    → a resolved reference, already bound as a typed proxy.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    Entity(Proxy),
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Uint(_) => "Uint",
            Self::Float(_) => "Float",
            Self::Char(_) => "Char",
            Self::Text(_) => "Text",
            Self::Timestamp(_) => "Timestamp",
            Self::Entity(_) => "Entity",
            Self::List(_) => "List",
        }
    }

    ///
    /// from_scalar_wire
    ///
    /// Lift an already-unboxed scalar wire value into its logical form.
    /// Timestamps and references stay textual here; the marshalling layer
    /// decides whether to decode them.
    ///
    #[must_use]
    pub fn from_scalar_wire(wire: WireValue) -> Self {
        match wire {
            WireValue::Null => Self::Null,
            WireValue::Boolean(v) => Self::Bool(v),
            WireValue::Sint8(v) => Self::Int(v.into()),
            WireValue::Sint16(v) => Self::Int(v.into()),
            WireValue::Sint32(v) => Self::Int(v.into()),
            WireValue::Sint64(v) => Self::Int(v),
            WireValue::Uint8(v) => Self::Uint(v.into()),
            WireValue::Uint16(v) => Self::Uint(v.into()),
            WireValue::Uint32(v) => Self::Uint(v.into()),
            WireValue::Uint64(v) => Self::Uint(v),
            WireValue::Real32(v) => Self::Float(f64::from(v)),
            WireValue::Real64(v) => Self::Float(v),
            WireValue::Char16(c) => Self::Char(c),
            WireValue::String(s) | WireValue::DateTime(s) | WireValue::Reference(s) => {
                Self::Text(s)
            }
            WireValue::Array(items) => {
                Self::List(items.into_iter().map(Self::from_scalar_wire).collect())
            }
        }
    }

    ///
    /// into_scalar_wire
    ///
    /// Box a scalar logical value as `target`. The logical variant's own
    /// width is an artifact of the declaration, so lossless width changes
    /// always apply here. Timestamps and entities are not scalars and must
    /// be encoded by the caller first.
    ///
    pub fn into_scalar_wire(self, target: WireType) -> Result<WireValue, CastError> {
        let natural = match self {
            Self::Null => return Ok(WireValue::Null),
            Self::Bool(v) => WireValue::Boolean(v),
            Self::Int(v) => WireValue::Sint64(v),
            Self::Uint(v) => WireValue::Uint64(v),
            Self::Float(v) => WireValue::Real64(v),
            Self::Char(c) => WireValue::Char16(c),
            Self::Text(s) => WireValue::String(s),
            Self::Timestamp(_) => return Err(CastError::new(WireType::DateTime, target)),
            Self::Entity(_) => return Err(CastError::new(WireType::Reference, target)),
            Self::List(items) => {
                return items
                    .into_iter()
                    .map(|item| item.into_scalar_wire(target))
                    .collect::<Result<Vec<_>, _>>()
                    .map(WireValue::Array);
            }
        };

        natural.coerce(target, false)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Proxy> for Value {
    fn from(v: Proxy) -> Self {
        Self::Entity(v)
    }
}

macro_rules! impl_value_from_int {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from_int!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
);
