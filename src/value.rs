use crate::{DbError, Result};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{Date, PrimitiveDateTime, Time};

/// Dynamically typed value moving between native Rust types and the
/// PostgreSQL wire. Each variant carries an `Option` so a NULL stays typed:
/// `Int32(None)` is a NULL integer, distinct from the untyped [`Value::Null`].
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Char(Option<char>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    List(Option<Vec<Value>>, /* element type: */ Box<Value>),
    Unknown(Option<String>),
}

impl Value {
    /// True for `Null` and for any variant carrying `None`.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Char(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::List(v, ..) => v.is_none(),
            Value::Unknown(v) => v.is_none(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "boolean",
            Value::Int16(..) => "smallint",
            Value::Int32(..) => "integer",
            Value::Int64(..) => "bigint",
            Value::Float32(..) => "real",
            Value::Float64(..) => "double precision",
            Value::Decimal(..) => "numeric",
            Value::Char(..) => "char",
            Value::Varchar(..) => "varchar",
            Value::Blob(..) => "bytea",
            Value::Date(..) => "date",
            Value::Time(..) => "time",
            Value::Timestamp(..) => "timestamp",
            Value::List(..) => "array",
            Value::Unknown(..) => "unknown",
        }
    }

    /// Text rendition used by the generic string accessor. NULL renders as
    /// `None`; a binary blob renders as upper-case hex with no separators
    /// rather than being interpreted as text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Boolean(Some(v)) => Some(v.to_string()),
            Value::Int16(Some(v)) => Some(v.to_string()),
            Value::Int32(Some(v)) => Some(v.to_string()),
            Value::Int64(Some(v)) => Some(v.to_string()),
            Value::Float32(Some(v)) => Some(v.to_string()),
            Value::Float64(Some(v)) => Some(v.to_string()),
            Value::Decimal(Some(v)) => Some(v.to_string()),
            Value::Char(Some(v)) => Some(v.to_string()),
            Value::Varchar(Some(v)) => Some(v.clone()),
            Value::Blob(Some(v)) => Some(hex::encode_upper(v)),
            Value::Date(Some(v)) => Some(v.to_string()),
            Value::Time(Some(v)) => Some(v.to_string()),
            Value::Timestamp(Some(v)) => Some(v.to_string()),
            Value::List(Some(values), ..) => {
                let mut out = String::from("{");
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&v.to_text().unwrap_or_default());
                }
                out.push('}');
                Some(out)
            }
            Value::Unknown(Some(v)) => Some(v.clone()),
            _ => None,
        }
    }
}

fn mismatch<T>(value: &Value) -> DbError {
    DbError::TypeMismatch {
        expected: any::type_name::<T>(),
        found: format!("{value:?}"),
    }
}

/// Conversion between native Rust types and [`Value`]. `as_value` wraps the
/// native value, `try_from_value` unwraps it back, accepting alternate
/// numeric widths with range checks.
pub trait AsValue {
    /// A NULL-carrying value of this type's canonical variant.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

macro_rules! impl_as_value_int {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                #[allow(unreachable_patterns)]
                match value {
                    $variant(Some(v)) => Ok(v),
                    Value::Int16(Some(v)) => {
                        <$source>::try_from(v).map_err(|_| mismatch::<Self>(&value))
                    }
                    Value::Int32(Some(v)) => {
                        <$source>::try_from(v).map_err(|_| mismatch::<Self>(&value))
                    }
                    Value::Int64(Some(v)) => {
                        <$source>::try_from(v).map_err(|_| mismatch::<Self>(&value))
                    }
                    Value::Decimal(Some(v)) => v
                        .to_i64()
                        .and_then(|v| <$source>::try_from(v).ok())
                        .ok_or_else(|| mismatch::<Self>(&value)),
                    ref v => Err(mismatch::<Self>(v)),
                }
            }
        }
    };
}
impl_as_value_int!(i16, Value::Int16);
impl_as_value_int!(i32, Value::Int32);
impl_as_value_int!(i64, Value::Int64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for f32 {
    fn as_empty_value() -> Value {
        Value::Float32(None)
    }
    fn as_value(self) -> Value {
        Value::Float32(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float32(Some(v)) => Ok(v),
            Value::Float64(Some(v)) => Ok(v as f32),
            Value::Decimal(Some(v)) => v.to_f32().ok_or_else(|| mismatch::<Self>(&value)),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for f64 {
    fn as_empty_value() -> Value {
        Value::Float64(None)
    }
    fn as_value(self) -> Value {
        Value::Float64(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float64(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => Ok(v as f64),
            Value::Decimal(Some(v)) => v.to_f64().ok_or_else(|| mismatch::<Self>(&value)),
            Value::Int16(Some(v)) => Ok(v as f64),
            Value::Int32(Some(v)) => Ok(v as f64),
            Value::Int64(Some(v)) => Ok(v as f64),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int16(Some(v)) => Ok(v.into()),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::Float32(Some(v)) => {
                Decimal::from_f32(v).ok_or_else(|| mismatch::<Self>(&value))
            }
            Value::Float64(Some(v)) => {
                Decimal::from_f64(v).ok_or_else(|| mismatch::<Self>(&value))
            }
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for char {
    fn as_empty_value() -> Value {
        Value::Char(None)
    }
    fn as_value(self) -> Value {
        Value::Char(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Char(Some(v)) => Ok(v.to_string()),
            Value::Unknown(Some(v)) => Ok(v),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.to_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        // A borrowed str cannot be produced from an owned Value.
        Err(mismatch::<Self>(&value))
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(PrimitiveDateTime::new(v, Time::MIDNIGHT)),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

// Homogeneous sequences marshal as array-of-element-type. Spelled out per
// element type so Vec<u8> can stay a bytea blob.
macro_rules! impl_as_value_vec {
    ($($element:ty),+ $(,)?) => {
        $(impl AsValue for Vec<$element> {
            fn as_empty_value() -> Value {
                Value::List(None, Box::new(<$element>::as_empty_value()))
            }
            fn as_value(self) -> Value {
                Value::List(
                    Some(self.into_iter().map(AsValue::as_value).collect()),
                    Box::new(<$element>::as_empty_value()),
                )
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::List(Some(values), ..) => {
                        values.into_iter().map(AsValue::try_from_value).collect()
                    }
                    ref v => Err(mismatch::<Self>(v)),
                }
            }
        })+
    };
}
impl_as_value_vec!(bool, i16, i32, i64, f32, f64, Decimal, String);
