use crate::{AsValue, DbError, Result, Value, WireType};
use time::PrimitiveDateTime;

/// Default capacity of an output-capable varchar parameter, sized for
/// round-tripping large output buffers.
pub const DEFAULT_VARCHAR_SIZE: i32 = 30000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    InputOutput,
}

impl Direction {
    pub fn is_output(&self) -> bool {
        matches!(self, Direction::Output | Direction::InputOutput)
    }
}

/// One named, typed call argument. The wire type is always resolved by the
/// time the parameter exists; an unsupported native type never constructs.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    value: Value,
    wire_type: WireType,
    direction: Direction,
    size: Option<i32>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &Value {
        &self.value
    }
    pub fn wire_type(&self) -> &WireType {
        &self.wire_type
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn size(&self) -> Option<i32> {
        self.size
    }
    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }
}

/// Insertion-ordered, name-unique parameter set for one stored call. Built
/// per call and discarded after it completes; output values are read back
/// through [`Params::out_param`] first.
#[derive(Debug, Clone, Default)]
pub struct Params {
    items: Vec<Parameter>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input parameter, inferring the wire type from the native value.
    pub fn add(&mut self, name: &str, value: impl AsValue) -> Result<&mut Self> {
        let value = value.as_value();
        let wire_type = WireType::infer(&value)?;
        self.insert(name, value, wire_type, Direction::Input, None, false)
    }

    /// Add an input parameter with an explicit wire type, bypassing
    /// inference. Required when the native representation is ambiguous,
    /// e.g. a string that actually carries JSON.
    pub fn add_with_type(
        &mut self,
        name: &str,
        value: impl AsValue,
        wire_type: WireType,
    ) -> Result<&mut Self> {
        self.insert(name, value.as_value(), wire_type, Direction::Input, None, true)
    }

    /// Add an input parameter with an explicit size.
    pub fn add_sized(&mut self, name: &str, value: impl AsValue, size: i32) -> Result<&mut Self> {
        let value = value.as_value();
        let wire_type = WireType::infer(&value)?;
        self.insert(name, value, wire_type, Direction::Input, Some(size), false)
    }

    /// Register an input-output parameter for call styles that return values
    /// through out-parameters rather than a return value.
    pub fn add_out_param(&mut self, name: &str, value: impl AsValue) -> Result<&mut Self> {
        let value = value.as_value();
        let wire_type = WireType::infer(&value)?;
        self.insert(name, value, wire_type, Direction::InputOutput, None, false)
    }

    pub fn add_out_param_sized(
        &mut self,
        name: &str,
        value: impl AsValue,
        size: i32,
        wire_type: WireType,
    ) -> Result<&mut Self> {
        self.insert(
            name,
            value.as_value(),
            wire_type,
            Direction::InputOutput,
            Some(size),
            true,
        )
    }

    fn insert(
        &mut self,
        name: &str,
        mut value: Value,
        wire_type: WireType,
        direction: Direction,
        size: Option<i32>,
        declared_type: bool,
    ) -> Result<&mut Self> {
        if self.contains(name) {
            return Err(DbError::DuplicateParameter(name.into()));
        }
        value = canonicalize_null(value, &wire_type, declared_type);
        let size = size.or_else(|| default_size(&value, &wire_type, direction));
        self.items.push(Parameter {
            name: name.into(),
            value,
            wire_type,
            direction,
            size,
        });
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.items.iter().find(|p| p.name == name)
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn has_outputs(&self) -> bool {
        self.items.iter().any(|p| p.direction.is_output())
    }

    pub(crate) fn output_params_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.items.iter_mut().filter(|p| p.direction.is_output())
    }

    /// Read back the returned value of an output-capable parameter after
    /// execution. `None` when the value is NULL or does not match `T`.
    pub fn out_param<T: AsValue>(&self, name: &str) -> Result<Option<T>> {
        let param = self
            .get(name)
            .ok_or_else(|| DbError::ParameterNotFound(name.into()))?;
        if !param.direction.is_output() {
            return Err(DbError::NotAnOutputParameter(name.into()));
        }
        if param.value.is_null() {
            return Ok(None);
        }
        Ok(T::try_from_value(param.value.clone()).ok())
    }

    /// Copy a returned output value into a caller-owned variable, replacing
    /// it with the type's default when the value is NULL or mismatched.
    pub fn update_out_param<T: AsValue + Default>(&self, name: &str, value: &mut T) -> Result<()> {
        *value = self.out_param(name)?.unwrap_or_default();
        Ok(())
    }

    /// As [`Params::update_out_param`] for types without a zero-equivalent
    /// default, e.g. timestamps.
    pub fn update_out_param_opt<T: AsValue>(
        &self,
        name: &str,
        value: &mut Option<T>,
    ) -> Result<()> {
        *value = self.out_param(name)?;
        Ok(())
    }
}

/// Null canonicalization: a NULL native value or the zero/epoch timestamp
/// sentinel marshal as SQL NULL; for a declared varchar/text or double
/// parameter the empty string and the minimum numeric sentinel do too.
/// Callers rely on the sentinel convention to "unset" a parameter.
fn canonicalize_null(value: Value, wire_type: &WireType, declared_type: bool) -> Value {
    match &value {
        Value::Timestamp(Some(v)) if *v == PrimitiveDateTime::MIN => Value::Timestamp(None),
        Value::Varchar(Some(v))
            if declared_type
                && matches!(wire_type, WireType::Varchar | WireType::Text)
                && v.is_empty() =>
        {
            Value::Varchar(None)
        }
        Value::Float64(Some(v))
            if declared_type && *wire_type == WireType::Double && *v == f64::MIN =>
        {
            Value::Float64(None)
        }
        Value::Decimal(Some(v))
            if declared_type
                && *wire_type == WireType::Double
                && *v == rust_decimal::Decimal::MIN =>
        {
            Value::Decimal(None)
        }
        _ => value,
    }
}

/// Explicit size wins (handled by the caller); otherwise an output-capable
/// string parameter gets the fixed default capacity and an input string the
/// length of the supplied value. All other types use the driver's natural
/// size.
fn default_size(value: &Value, wire_type: &WireType, direction: Direction) -> Option<i32> {
    if !matches!(wire_type, WireType::Varchar | WireType::Text) {
        return None;
    }
    if direction.is_output() {
        return Some(DEFAULT_VARCHAR_SIZE);
    }
    match value {
        Value::Varchar(Some(v)) => Some(v.len() as i32),
        _ => None,
    }
}
