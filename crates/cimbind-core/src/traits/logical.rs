use crate::{
    model::LogicalType,
    value::{Value, WireType},
};
use chrono::{DateTime, FixedOffset};

///
/// Logical
///
/// Typed boundary between declarations and the dynamic `Value`.
///
/// `from_value(Value::Null)` yields the type's zero-equivalent (numeric
/// zero, empty, `None`), or `None` when the type has no such value (a
/// non-optional entity reference).
///

pub trait Logical: Sized {
    const TYPE: LogicalType;

    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

// impl_logical_int
macro_rules! impl_logical_int {
    ( $( $type:ty => $variant:ident, $wire:ident ),* $(,)? ) => {
        $(
            impl Logical for $type {
                const TYPE: LogicalType = LogicalType::Scalar(WireType::$wire);

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Null => Some(0),
                        Value::Int(v) => v.try_into().ok(),
                        Value::Uint(v) => v.try_into().ok(),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(self.into())
                }
            }
        )*
    };
}

impl_logical_int!(
    i8 => Int, Sint8,
    i16 => Int, Sint16,
    i32 => Int, Sint32,
    i64 => Int, Sint64,
    u8 => Uint, Uint8,
    u16 => Uint, Uint16,
    u32 => Uint, Uint32,
    u64 => Uint, Uint64,
);

impl Logical for bool {
    const TYPE: LogicalType = LogicalType::Scalar(WireType::Boolean);

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(false),
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl Logical for f64 {
    const TYPE: LogicalType = LogicalType::Scalar(WireType::Real64);

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(0.0),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl Logical for f32 {
    const TYPE: LogicalType = LogicalType::Scalar(WireType::Real32);

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(0.0),
            // Real32 wire values widen exactly, so narrowing back is lossless
            Value::Float(v) => Some(v as Self),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self.into())
    }
}

impl Logical for char {
    const TYPE: LogicalType = LogicalType::Scalar(WireType::Char16);

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some('\0'),
            Value::Char(c) => Some(c),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Char(self)
    }
}

impl Logical for String {
    const TYPE: LogicalType = LogicalType::Scalar(WireType::String);

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl Logical for DateTime<FixedOffset> {
    const TYPE: LogicalType = LogicalType::Timestamp;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => DateTime::from_timestamp(0, 0).map(|ts| ts.fixed_offset()),
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }
}

impl<T: Logical> Logical for Option<T> {
    const TYPE: LogicalType = T::TYPE;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }
}

impl<T: Logical> Logical for Vec<T> {
    const TYPE: LogicalType = LogicalType::Array(T::TYPE.element());

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(T::into_value).collect())
    }
}
