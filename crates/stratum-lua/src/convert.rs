//! Strict conversion of Lua values into config values
//!
//! A table becomes a JSON array when its keys are exactly `1..=n` and an
//! object when every key is a string. Anything that would have to be
//! dropped or reinterpreted to fit JSON is rejected, so a script result is
//! either converted in full or not at all.

use crate::error::LuaError;
use mlua::{Lua, LuaSerdeExt, Table, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Tables nested deeper than this are rejected (this also catches cycles)
pub const MAX_DEPTH: usize = 128;

/// Convert a Lua value into a JSON value without losing entries
///
/// Errors name the offending location, starting from `result`.
pub fn lua_to_json(lua: &Lua, value: &Value) -> Result<JsonValue, LuaError> {
    convert(lua, value, "result", 0)
}

fn convert(lua: &Lua, value: &Value, at: &str, depth: usize) -> Result<JsonValue, LuaError> {
    match value {
        Value::Nil => Ok(JsonValue::Null),
        v if v.is_null() => Ok(JsonValue::Null),
        Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
        Value::Integer(i) => Ok(JsonValue::from(*i)),
        Value::Number(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| rejected(at, format!("number {n} has no JSON form"))),
        Value::String(s) => s
            .to_str()
            .map(|s| JsonValue::String(s.to_string()))
            .map_err(|_| rejected(at, "string is not valid UTF-8")),
        Value::Table(table) => convert_table(lua, table, at, depth),
        other => Err(rejected(
            at,
            format!("{} values cannot be encoded", other.type_name()),
        )),
    }
}

fn convert_table(lua: &Lua, table: &Table, at: &str, depth: usize) -> Result<JsonValue, LuaError> {
    if depth >= MAX_DEPTH {
        return Err(rejected(
            at,
            format!("tables nested deeper than {MAX_DEPTH} levels"),
        ));
    }

    let mut indexed: Vec<(i64, Value)> = Vec::new();
    let mut named: Vec<(String, Value)> = Vec::new();

    for pair in table.pairs::<Value, Value>() {
        let (key, value) = pair?;
        match key {
            Value::Integer(i) => indexed.push((i, value)),
            Value::String(s) => {
                let key = s
                    .to_str()
                    .map_err(|_| rejected(at, "table key is not valid UTF-8"))?
                    .to_string();
                named.push((key, value));
            }
            other => {
                return Err(rejected(
                    at,
                    format!("{} keys are not allowed", other.type_name()),
                ))
            }
        }
    }

    if !indexed.is_empty() && !named.is_empty() {
        return Err(rejected(at, "table mixes array entries and string keys"));
    }

    if !indexed.is_empty() {
        indexed.sort_unstable_by_key(|(i, _)| *i);
        let mut items = Vec::with_capacity(indexed.len());
        for (expected, (index, value)) in (1..).zip(&indexed) {
            if *index != expected {
                return Err(rejected(
                    at,
                    format!("array is sparse (index {index} where {expected} was expected)"),
                ));
            }
            items.push(convert(lua, value, &format!("{at}[{index}]"), depth + 1)?);
        }
        return Ok(JsonValue::Array(items));
    }

    if named.is_empty() && table.metatable() == Some(lua.array_metatable()) {
        return Ok(JsonValue::Array(Vec::new()));
    }

    let mut map = Map::new();
    for (key, value) in named {
        let converted = convert(lua, &value, &format!("{at}.{key}"), depth + 1)?;
        map.insert(key, converted);
    }
    Ok(JsonValue::Object(map))
}

fn rejected(at: &str, reason: impl std::fmt::Display) -> LuaError {
    LuaError::Conversion(format!("{at}: {reason}"))
}
