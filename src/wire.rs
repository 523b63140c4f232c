use crate::{DbError, Result, Value};
use postgres_types::Type;
use std::fmt::{self, Display};

/// Protocol type tag bound to a parameter, distinct from the native
/// in-process value type. Resolved at parameter construction time, either
/// inferred from the native value or supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    Text,
    Date,
    Time,
    Timestamp,
    Bytea,
    Array(Box<WireType>),
    Refcursor,
    Unknown,
}

impl WireType {
    /// Infer the wire type from a native value via the fixed type table.
    /// A NULL without declared type binds as `Unknown` and lets the server
    /// coerce it. Fails with [`DbError::UnsupportedType`] when the value has
    /// no mapping, before any call is issued.
    pub fn infer(value: &Value) -> Result<WireType> {
        Ok(match value {
            Value::Null => WireType::Unknown,
            Value::Boolean(..) => WireType::Boolean,
            Value::Int16(..) => WireType::Smallint,
            Value::Int32(..) => WireType::Integer,
            Value::Int64(..) => WireType::Bigint,
            Value::Float32(..) => WireType::Real,
            Value::Float64(..) => WireType::Double,
            Value::Decimal(..) => WireType::Numeric,
            Value::Char(..) => WireType::Char,
            // Plain strings infer as text; varchar only when declared.
            Value::Varchar(..) => WireType::Text,
            Value::Blob(..) => WireType::Bytea,
            Value::Date(..) => WireType::Date,
            Value::Time(..) => WireType::Time,
            Value::Timestamp(..) => WireType::Timestamp,
            Value::List(_, element) => match WireType::infer(element)? {
                WireType::Unknown => {
                    return Err(DbError::UnsupportedType(format!(
                        "{}[]",
                        element.type_name()
                    )));
                }
                element => WireType::Array(Box::new(element)),
            },
            Value::Unknown(..) => {
                return Err(DbError::UnsupportedType(value.type_name().into()));
            }
        })
    }

    /// The driver-level type used with `prepare_typed`.
    pub fn to_pg_type(&self) -> Type {
        match self {
            WireType::Boolean => Type::BOOL,
            WireType::Smallint => Type::INT2,
            WireType::Integer => Type::INT4,
            WireType::Bigint => Type::INT8,
            WireType::Real => Type::FLOAT4,
            WireType::Double => Type::FLOAT8,
            WireType::Numeric => Type::NUMERIC,
            WireType::Char => Type::BPCHAR,
            WireType::Varchar => Type::VARCHAR,
            WireType::Text => Type::TEXT,
            WireType::Date => Type::DATE,
            WireType::Time => Type::TIME,
            WireType::Timestamp => Type::TIMESTAMP,
            WireType::Bytea => Type::BYTEA,
            WireType::Array(element) => match element.as_ref() {
                WireType::Boolean => Type::BOOL_ARRAY,
                WireType::Smallint => Type::INT2_ARRAY,
                WireType::Integer => Type::INT4_ARRAY,
                WireType::Bigint => Type::INT8_ARRAY,
                WireType::Real => Type::FLOAT4_ARRAY,
                WireType::Double => Type::FLOAT8_ARRAY,
                WireType::Numeric => Type::NUMERIC_ARRAY,
                WireType::Char => Type::BPCHAR_ARRAY,
                WireType::Varchar => Type::VARCHAR_ARRAY,
                WireType::Text => Type::TEXT_ARRAY,
                WireType::Date => Type::DATE_ARRAY,
                WireType::Time => Type::TIME_ARRAY,
                WireType::Timestamp => Type::TIMESTAMP_ARRAY,
                WireType::Bytea => Type::BYTEA_ARRAY,
                _ => Type::ANYARRAY,
            },
            WireType::Refcursor => Type::REFCURSOR,
            WireType::Unknown => Type::UNKNOWN,
        }
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Array(element) => write!(f, "{}[]", element),
            _ => write!(f, "{}", self.to_pg_type()),
        }
    }
}
