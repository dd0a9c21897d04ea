//! `json` module for config scripts
//!
//! Preloaded into every interpreter, so scripts can build config from JSON
//! fragments or serialise tables for logging.
//!
//! ## Usage in Lua
//!
//! ```lua
//! local json = require("json")
//!
//! local obj = json.decode('{"x": 1}')
//! local str = json.encode(obj)      -- {"x":1}
//! local pretty = json.pretty(obj)   -- indented JSON
//! local absent = json.null          -- encodes as null
//! ```

use crate::convert::lua_to_json;
use crate::error::LuaError;
use mlua::{Lua, LuaSerdeExt, MultiValue, Table, Value};
use serde_json::Value as JsonValue;

/// Module name scripts pass to `require`
pub const MODULE_NAME: &str = "json";

/// Register the json module in `package.preload`
pub fn register_json_module(lua: &Lua, preload: &Table) -> mlua::Result<()> {
    let open = lua.create_function(|lua, _: MultiValue| create_json_table(lua))?;
    preload.set(MODULE_NAME, open)
}

fn create_json_table(lua: &Lua) -> mlua::Result<Table> {
    let json = lua.create_table()?;

    // json.encode(value) -> string (compact JSON)
    let encode_fn = lua.create_function(|lua, value: Value| {
        serde_json::to_string(&encodable(lua, &value)?).map_err(mlua::Error::external)
    })?;
    json.set("encode", encode_fn)?;

    // json.pretty(value) -> string (pretty-printed JSON)
    let pretty_fn = lua.create_function(|lua, value: Value| {
        serde_json::to_string_pretty(&encodable(lua, &value)?).map_err(mlua::Error::external)
    })?;
    json.set("pretty", pretty_fn)?;

    // json.decode(str) -> value
    let decode_fn = lua.create_function(|lua, s: String| {
        let value: JsonValue = serde_json::from_str(&s).map_err(mlua::Error::external)?;
        lua.to_value(&value)
    })?;
    json.set("decode", decode_fn)?;

    json.set("null", lua.null())?;

    Ok(json)
}

fn encodable(lua: &Lua, value: &Value) -> mlua::Result<JsonValue> {
    lua_to_json(lua, value).map_err(|e| match e {
        LuaError::Runtime(err) => err,
        other => mlua::Error::RuntimeError(other.to_string()),
    })
}
