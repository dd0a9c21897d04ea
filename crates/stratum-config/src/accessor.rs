//! Typed extraction of configuration values
//!
//! `bool` and string reads require an exact match: a number is never
//! stringified and a string is never parsed as a bool. Numeric reads coerce
//! between integer and float representations. Everything else goes through
//! serde, keyed on the destination's field names exactly as serde sees them
//! (case-sensitive, honouring `#[serde(rename)]` and `rename_all`). Source
//! keys the destination does not declare are ignored.

use crate::error::{ConfigError, Result};
use crate::merge::merge_trees;
use crate::value::{type_name, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Outcome of a typed read with a fallback
///
/// Always carries a usable value: the stored one on success, the caller's
/// default on failure. The error, if any, travels alongside so the caller can
/// decide whether a fallback is acceptable.
#[derive(Debug)]
#[must_use]
pub struct Lookup<T> {
    value: T,
    error: Option<ConfigError>,
}

impl<T> Lookup<T> {
    pub(crate) fn resolve(result: Result<T>, default: T) -> Self {
        match result {
            Ok(value) => Self { value, error: None },
            Err(error) => Self {
                value: default,
                error: Some(error),
            },
        }
    }

    /// The stored value, or the default if the read failed
    pub fn value(self) -> T {
        self.value
    }

    /// Borrow the value without consuming the lookup
    pub fn get(&self) -> &T {
        &self.value
    }

    /// The error that forced the default, if any
    pub fn error(&self) -> Option<&ConfigError> {
        self.error.as_ref()
    }

    /// Whether the stored value was used
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Split into the value and the optional error
    pub fn into_parts(self) -> (T, Option<ConfigError>) {
        (self.value, self.error)
    }

    /// Discard the default and surface the error instead
    pub fn into_result(self) -> Result<T> {
        match self.error {
            None => Ok(self.value),
            Some(error) => Err(error),
        }
    }
}

fn mismatch(path: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: type_name(value),
    }
}

/// Read a bool; no coercion from other types
pub fn as_bool(path: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch(path, "bool", other)),
    }
}

/// Read a string; no coercion from other types
pub fn as_string(path: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(mismatch(path, "string", other)),
    }
}

/// Read an integer
///
/// Integral numbers of any representation are accepted. Floats are truncated
/// toward zero; NaN, infinities and values outside `i64` fail.
pub fn as_int(path: &str, value: &Value) -> Result<i64> {
    let Value::Number(n) = value else {
        return Err(mismatch(path, "int", value));
    };

    if let Some(i) = n.as_i64() {
        return Ok(i);
    }

    match n.as_f64() {
        Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f.trunc() as i64)
        }
        _ => Err(ConfigError::Decode {
            path: path.to_string(),
            message: format!("{} does not fit in an int", n),
        }),
    }
}

/// Read a float from any number
pub fn as_float(path: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(path, "float", value)),
        other => Err(mismatch(path, "float", other)),
    }
}

/// Decode a value into any deserializable type
pub fn decode<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| ConfigError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Decode a value over an existing destination
///
/// Fields present in the source replace the destination's; fields the source
/// does not mention keep their current values. The destination is only
/// written if the whole decode succeeds.
pub fn decode_into<T>(path: &str, value: &Value, target: &mut T) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let current = serde_json::to_value(&*target).map_err(|e| ConfigError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let layered = match (current, value) {
        (Value::Object(mut base), Value::Object(incoming)) => {
            merge_trees(&mut base, incoming.clone());
            Value::Object(base)
        }
        (_, other) => other.clone(),
    };

    *target = decode(path, &layered)?;
    Ok(())
}
