//! The closed conversion table between Rust member types and wire JSON.
//!
//! Every type that may appear as a property, telemetry or component value implements
//! [`WireValue`]. Scalars, options, sequences and string-keyed maps are covered here;
//! the derive macros add impls for twins, `#[twin_object]` structs and `#[twin_enum]`
//! enumerations.

use crate::descriptor::{EnumDescriptor, ScalarKind, ValueType};
use crate::error::TwinError;
use crate::types::ETag;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::str::FromStr;
use uuid::Uuid;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub trait WireValue: Sized {
    fn value_type() -> ValueType;

    /// `Ok(None)` when the value is absent and should not be written.
    fn to_wire(&self) -> Result<Option<Value>, TwinError>;

    fn from_wire(value: Value) -> Result<Self, TwinError>;
}

fn mismatch(expected: &str, value: &Value) -> TwinError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    TwinError::coercion(format!("expected {expected}, found {found}"))
}

impl WireValue for String {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::String)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.clone())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl WireValue for bool {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Boolean)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::Bool(*self)))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        value.as_bool().ok_or_else(|| mismatch("a boolean", &value))
    }
}

/// Integral reading of a JSON number. Floats are accepted only without a fractional part.
#[allow(clippy::cast_possible_truncation)]
fn integral(value: &Value) -> Result<i128, TwinError> {
    let Value::Number(number) = value else {
        return Err(mismatch("an integer", value));
    };
    if let Some(n) = number.as_i64() {
        return Ok(i128::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Ok(i128::from(n));
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e19 => Ok(f as i128),
        _ => Err(TwinError::coercion(format!("{number} is not an integer"))),
    }
}

macro_rules! integer_wire {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl WireValue for $ty {
            fn value_type() -> ValueType {
                ValueType::Scalar(ScalarKind::$kind)
            }

            fn to_wire(&self) -> Result<Option<Value>, TwinError> {
                Ok(Some(Value::from(*self)))
            }

            fn from_wire(value: Value) -> Result<Self, TwinError> {
                let n = integral(&value)?;
                <$ty>::try_from(n).map_err(|_| {
                    TwinError::coercion(format!("{n} is out of range for {}", stringify!($ty)))
                })
            }
        }
    )*};
}

integer_wire! {
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Long,
    u8 => Integer,
    u16 => Integer,
    u32 => Long,
    u64 => Long,
}

impl WireValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Double)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Number::from_f64(*self)
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| TwinError::coercion(format!("{self} has no JSON representation")))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        value.as_f64().ok_or_else(|| mismatch("a number", &value))
    }
}

impl WireValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Float)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        f64::from(*self).to_wire()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_wire(value: Value) -> Result<Self, TwinError> {
        let wide = f64::from_wire(value)?;
        if wide.is_finite() && wide.abs() > f64::from(Self::MAX) {
            return Err(TwinError::coercion(format!("{wide} is out of range for f32")));
        }
        Ok(wide as Self)
    }
}

impl WireValue for Decimal {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Decimal)
    }

    /// Written as the exact decimal token, never through `f64`.
    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        let number = Number::from_str(&self.normalize().to_string())
            .map_err(|err| TwinError::coercion(format!("decimal {self}: {err}")))?;
        Ok(Some(Value::Number(number)))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        let text = match &value {
            Value::Number(n) => n.as_str().to_owned(),
            Value::String(s) => s.clone(),
            other => return Err(mismatch("a decimal", other)),
        };
        Self::from_str(&text)
            .or_else(|_| Self::from_scientific(&text))
            .map_err(|err| TwinError::coercion(format!("{text} is not a decimal: {err}")))
    }
}

impl WireValue for char {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Char)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.to_string())))
    }

    /// First character of the string, `'\0'` for an empty one.
    fn from_wire(value: Value) -> Result<Self, TwinError> {
        match value {
            Value::String(s) => Ok(s.chars().next().unwrap_or('\0')),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl WireValue for Uuid {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::Uuid)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.hyphenated().to_string())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        let text = String::from_wire(value)?;
        Self::parse_str(&text)
            .map_err(|err| TwinError::coercion(format!("{text} is not a UUID: {err}")))
    }
}

impl WireValue for DateTime<FixedOffset> {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::DateTime)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.to_rfc3339())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        let text = String::from_wire(value)?;
        Self::parse_from_rfc3339(&text)
            .map_err(|err| TwinError::coercion(format!("{text} is not an RFC 3339 timestamp: {err}")))
    }
}

impl WireValue for DateTime<Utc> {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::DateTime)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.to_rfc3339())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        DateTime::<FixedOffset>::from_wire(value).map(|ts| ts.with_timezone(&Utc))
    }
}

impl WireValue for NaiveDateTime {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::DateTime)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.format(NAIVE_FORMAT).to_string())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        let text = String::from_wire(value)?;
        Self::parse_from_str(&text, NAIVE_FORMAT)
            .map_err(|err| TwinError::coercion(format!("{text} is not a timestamp: {err}")))
    }
}

impl WireValue for ETag {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarKind::ETag)
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        Ok(Some(Value::String(self.as_str().to_owned())))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        String::from_wire(value).map(|raw| Self::new(raw.trim_matches('"')))
    }
}

impl<T: WireValue> WireValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        self.as_ref().map_or(Ok(None), T::to_wire)
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_wire(other).map(Some),
        }
    }
}

impl<T: WireValue> WireValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::Array(Box::new(T::value_type()))
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        let items = self
            .iter()
            .map(|item| item.to_wire().map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(items)))
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_wire).collect(),
            other => Err(mismatch("an array", &other)),
        }
    }
}

fn map_to_wire<'a, T: WireValue + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
) -> Result<Option<Value>, TwinError> {
    let mut object = serde_json::Map::new();
    for (key, item) in entries {
        object.insert(key.clone(), item.to_wire()?.unwrap_or_default());
    }
    Ok(Some(Value::Object(object)))
}

fn map_from_wire<T: WireValue, C: FromIterator<(String, T)>>(value: Value) -> Result<C, TwinError> {
    match value {
        Value::Object(object) => {
            object.into_iter().map(|(key, item)| T::from_wire(item).map(|v| (key, v))).collect()
        },
        other => Err(mismatch("an object", &other)),
    }
}

impl<T: WireValue, S: BuildHasher + Default> WireValue for HashMap<String, T, S> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        map_to_wire(self.iter())
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        map_from_wire(value)
    }
}

impl<T: WireValue> WireValue for BTreeMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn to_wire(&self) -> Result<Option<Value>, TwinError> {
        map_to_wire(self.iter())
    }

    fn from_wire(value: Value) -> Result<Self, TwinError> {
        map_from_wire(value)
    }
}

/// Discriminant named by a wire value: a number, a numeric string or a member name.
pub fn enum_discriminant(descriptor: &EnumDescriptor, value: &Value) -> Result<i64, TwinError> {
    match value {
        Value::Number(_) => {
            let n = integral(value)?;
            i64::try_from(n).map_err(|_| {
                TwinError::coercion(format!("{n} is out of range for {}", descriptor.name))
            })
        },
        Value::String(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(n);
            }
            descriptor.by_name(text).map(|member| member.value).ok_or_else(|| {
                TwinError::coercion(format!("`{text}` is not a member of {}", descriptor.name))
            })
        },
        other => Err(mismatch("an enumeration value", other)),
    }
}

pub fn object_to_value<T: Serialize>(object: &T) -> Result<Value, TwinError> {
    Ok(serde_json::to_value(object)?)
}

pub fn object_from_value<T: DeserializeOwned>(value: Value) -> Result<T, TwinError> {
    Ok(serde_json::from_value(value)?)
}
