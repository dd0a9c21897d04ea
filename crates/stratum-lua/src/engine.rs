//! Lua evaluation of config scripts
//!
//! Each evaluation builds a fresh interpreter, preloads modules, runs the
//! chunk and converts its first return value into a config value, failing
//! rather than dropping entries JSON cannot hold. The interpreter is dropped before `evaluate` returns, so nothing a
//! script does survives into the next load.

use crate::convert::lua_to_json;
use crate::error::LuaError;
use crate::json::register_json_module;
use mlua::{Lua, LuaOptions, MultiValue, StdLib, Table, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use stratum_config::{ConfigError, ScriptEngine};
use tracing::debug;

/// Builds the value a custom module returns from `require`
pub type ModuleLoader = Arc<dyn Fn(&Lua) -> mlua::Result<Value> + Send + Sync>;

/// Lua 5.4 script engine
///
/// ```rust
/// use stratum_config::Settings;
/// use stratum_lua::LuaEngine;
///
/// let engine = LuaEngine::new().with_module("defaults", |lua| {
///     let t = lua.create_table()?;
///     t.set("port", 8080)?;
///     Ok(mlua::Value::Table(t))
/// });
///
/// let mut settings = Settings::with_script_engine(engine);
/// settings.load_script(r#"
///     local defaults = require("defaults")
///     return { server = { port = defaults.port + 1 } }
/// "#)?;
/// assert_eq!(settings.get_int("server:port", 0).value(), 8081);
/// # Ok::<(), stratum_config::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct LuaEngine {
    stdlib: StdLib,
    memory_limit: Option<usize>,
    modules: BTreeMap<String, ModuleLoader>,
}

impl fmt::Debug for LuaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaEngine")
            .field("memory_limit", &self.memory_limit)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for LuaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LuaEngine {
    /// Create an engine with the safe standard libraries and no modules
    pub fn new() -> Self {
        Self {
            stdlib: StdLib::ALL_SAFE,
            memory_limit: None,
            modules: BTreeMap::new(),
        }
    }

    /// Restrict the standard libraries scripts can use
    ///
    /// `package` is always opened so `require` can reach preloaded modules.
    pub fn with_stdlib(mut self, libs: StdLib) -> Self {
        self.stdlib = libs;
        self
    }

    /// Cap the memory a single evaluation may allocate
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Builder form of [`register_module`](Self::register_module)
    pub fn with_module<F>(mut self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&Lua) -> mlua::Result<Value> + Send + Sync + 'static,
    {
        self.register_module(name, loader);
        self
    }

    /// Make `loader` available to scripts as `require(name)`
    ///
    /// Registering a name twice replaces the earlier loader. A module named
    /// `json` shadows the built-in one.
    pub fn register_module<F>(&mut self, name: impl Into<String>, loader: F)
    where
        F: Fn(&Lua) -> mlua::Result<Value> + Send + Sync + 'static,
    {
        self.modules.insert(name.into(), Arc::new(loader));
    }

    /// Names of the registered custom modules
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    fn create_state(&self) -> Result<Lua, LuaError> {
        let lua = Lua::new_with(self.stdlib | StdLib::PACKAGE, LuaOptions::new())?;
        if let Some(limit) = self.memory_limit {
            lua.set_memory_limit(limit)?;
        }

        let package: Table = lua.globals().get("package")?;
        let preload: Table = package.get("preload")?;
        register_json_module(&lua, &preload)?;

        for (name, loader) in &self.modules {
            if name.is_empty() {
                return Err(LuaError::InvalidModuleName(name.clone()));
            }
            let loader = Arc::clone(loader);
            let open = lua.create_function(move |lua, _: MultiValue| loader(lua))?;
            preload.set(name.as_str(), open)?;
            debug!("Preloaded Lua module {}", name);
        }

        Ok(lua)
    }

    /// Run `source` and convert its result to a JSON value
    pub fn eval_json(&self, source: &str, chunk_name: &str) -> Result<JsonValue, LuaError> {
        let lua = self.create_state()?;
        let result: Value = lua.load(source).set_name(chunk_name).eval()?;
        lua_to_json(&lua, &result)
    }
}

impl ScriptEngine for LuaEngine {
    fn name(&self) -> &str {
        "lua"
    }

    fn evaluate(&self, source: &str, chunk_name: &str) -> Result<JsonValue, ConfigError> {
        self.eval_json(source, chunk_name)
            .map_err(|e| e.in_chunk(chunk_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eval_nested_table() {
        let engine = LuaEngine::new();
        let value = engine
            .eval_json(
                r#"return { server = { port = 8080, hosts = { "a", "b" } }, debug = true }"#,
                "inline",
            )
            .unwrap();
        assert_eq!(
            value,
            json!({"server": {"port": 8080, "hosts": ["a", "b"]}, "debug": true})
        );
    }

    #[test]
    fn test_eval_computed_values() {
        let engine = LuaEngine::new();
        let value = engine
            .eval_json(
                r#"
                local workers = {}
                for i = 1, 3 do
                    workers[i] = "worker-" .. i
                end
                return { workers = workers, total = #workers * 2.5 }
            "#,
                "inline",
            )
            .unwrap();
        assert_eq!(
            value,
            json!({"workers": ["worker-1", "worker-2", "worker-3"], "total": 7.5})
        );
    }

    #[test]
    fn test_eval_no_return_is_null() {
        let engine = LuaEngine::new();
        let value = engine.eval_json("local x = 1", "inline").unwrap();
        assert_eq!(value, JsonValue::Null);
    }

    #[test]
    fn test_function_in_result_fails() {
        let engine = LuaEngine::new();
        let err = engine
            .eval_json("return { f = function() end }", "inline")
            .unwrap_err();
        assert!(matches!(err, LuaError::Conversion(_)));
    }

    #[test]
    fn test_syntax_error_is_script_error() {
        let engine = LuaEngine::new();
        let err = engine.evaluate("return {", "broken.lua").unwrap_err();
        match err {
            ConfigError::Script { chunk, .. } => assert_eq!(chunk, "broken.lua"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_runtime_error_is_script_error() {
        let engine = LuaEngine::new();
        let err = engine
            .evaluate(r#"error("no config for you")"#, "inline")
            .unwrap_err();
        assert!(err.to_string().contains("no config for you"));
    }

    #[test]
    fn test_registered_module_is_required() {
        let engine = LuaEngine::new().with_module("greeting", |lua| {
            let t = lua.create_table()?;
            t.set("hello", "world")?;
            Ok(Value::Table(t))
        });

        let value = engine
            .eval_json(r#"return { msg = require("greeting").hello }"#, "inline")
            .unwrap();
        assert_eq!(value, json!({"msg": "world"}));
        assert_eq!(engine.module_names().collect::<Vec<_>>(), vec!["greeting"]);
    }

    #[test]
    fn test_json_module_is_preloaded() {
        let engine = LuaEngine::new();
        let value = engine
            .eval_json(
                r#"return require("json").decode('{"from": "json", "n": [1, 2]}')"#,
                "inline",
            )
            .unwrap();
        assert_eq!(value, json!({"from": "json", "n": [1, 2]}));
    }

    #[test]
    fn test_user_module_shadows_json() {
        let engine = LuaEngine::new().with_module("json", |_| Ok(Value::Integer(42)));
        let value = engine
            .eval_json(r#"return { v = require("json") }"#, "inline")
            .unwrap();
        assert_eq!(value, json!({"v": 42}));
    }

    #[test]
    fn test_unknown_module_fails() {
        let engine = LuaEngine::new();
        assert!(engine.evaluate(r#"return require("nope")"#, "inline").is_err());
    }

    #[test]
    fn test_empty_module_name_rejected() {
        let engine = LuaEngine::new().with_module("", |_| Ok(Value::Nil));
        let err = engine.eval_json("return {}", "inline").unwrap_err();
        assert!(matches!(err, LuaError::InvalidModuleName(_)));
    }

    #[test]
    fn test_state_does_not_persist() {
        let engine = LuaEngine::new();
        engine.eval_json("leaked = 1", "first").unwrap();
        let value = engine
            .eval_json("return { seen = leaked ~= nil }", "second")
            .unwrap();
        assert_eq!(value, json!({"seen": false}));
    }

    #[test]
    fn test_restricted_stdlib() {
        let engine = LuaEngine::new().with_stdlib(StdLib::MATH | StdLib::STRING);
        assert!(engine
            .eval_json("return { home = os.getenv('HOME') }", "inline")
            .is_err());
        let value = engine
            .eval_json("return { n = math.floor(2.7) }", "inline")
            .unwrap();
        assert_eq!(value, json!({"n": 2}));
    }

    #[test]
    fn test_memory_limit() {
        let engine = LuaEngine::new().with_memory_limit(512 * 1024);
        let err = engine
            .eval_json(
                r#"
                local t = {}
                for i = 1, 10000000 do t[i] = tostring(i) end
                return {}
            "#,
                "inline",
            )
            .unwrap_err();
        assert!(matches!(err, LuaError::Runtime(_)));
    }
}
