//! Integration tests for Lua config sources layered with structured data

use serde::Deserialize;
use serde_json::json;
use std::fs;
use stratum_config::{ConfigError, Format, Settings};
use stratum_lua::{lua_settings, LuaEngine};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// LOADING LUA FILES
// ============================================================================

#[test]
fn test_lua_file_layers_over_json() {
    let dir = TempDir::new().unwrap();
    let base = write(
        &dir,
        "base.json",
        r#"{"server": {"port": 80, "host": "localhost"}, "tags": ["a", "b"]}"#,
    );
    let script = write(
        &dir,
        "override.lua",
        r#"
        return {
            server = { port = 8000 + 80 },
            tags = { "c" },
        }
        "#,
    );

    let mut settings = lua_settings();
    settings.load_file(&base).unwrap();
    settings.load_file(&script).unwrap();

    assert_eq!(settings.get_int("server:port", 0).value(), 8080);
    assert_eq!(settings.get_string("server:host", "").value(), "localhost");
    assert_eq!(settings.raw_get("tags").unwrap(), &json!(["c"]));
}

#[test]
fn test_load_script_file_directly() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "conf.script", r#"return { enabled = true }"#);

    let mut settings = lua_settings();
    settings.load_script_file(&script).unwrap();
    assert!(settings.get_bool("enabled", false).value());
}

#[test]
fn test_inline_script_and_bytes() {
    let mut settings = lua_settings();
    settings.load_script(r#"return { a = { x = 1 } }"#).unwrap();
    settings
        .load_bytes(br#"return { a = { y = 2 } }"#, Format::Lua)
        .unwrap();

    assert_eq!(settings.raw_get("a").unwrap(), &json!({"x": 1, "y": 2}));
}

#[test]
fn test_script_can_decode_json_fragments() {
    let mut settings = lua_settings();
    settings
        .load_script(
            r#"
            local json = require("json")
            local conf = json.decode('{"log": {"level": "info"}}')
            conf.log.level = "debug"
            return conf
            "#,
        )
        .unwrap();

    assert_eq!(settings.get_string("log:level", "").value(), "debug");
}

#[test]
fn test_script_returning_nothing_merges_nothing() {
    let mut settings = lua_settings();
    settings.load_json(br#"{"keep": 1}"#).unwrap();
    settings.load_script("local unused = 5").unwrap();
    assert_eq!(settings.to_json(), br#"{"keep":1}"#);
}

// ============================================================================
// MODULES
// ============================================================================

#[test]
fn test_custom_module_available_to_file() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "app.lua",
        r#"
        local env = require("env")
        return { database = { url = env.prefix .. "://db.internal" } }
        "#,
    );

    let engine = LuaEngine::new().with_module("env", |lua| {
        let t = lua.create_table()?;
        t.set("prefix", "postgres")?;
        Ok(mlua::Value::Table(t))
    });
    let mut settings = Settings::with_script_engine(engine);
    settings.load_file(&script).unwrap();

    #[derive(Debug, Deserialize)]
    struct Database {
        url: String,
    }
    let db: Database = settings.get("database").unwrap();
    assert_eq!(db.url, "postgres://db.internal");
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_failed_script_leaves_store_unchanged() {
    let mut settings = lua_settings();
    settings.load_json(br#"{"a": {"b": 1}}"#).unwrap();
    let before = settings.to_json();

    for source in [
        "return {",
        r#"error("boom")"#,
        "return { 1, 2, 3 }",
        "return 42",
        "return { cb = function() end }",
    ] {
        let err = settings.load_script(source).unwrap_err();
        assert!(err.is_load_failure(), "{source}: {err}");
        assert_eq!(settings.to_json(), before, "store changed after {source}");
    }
}

#[test]
fn test_lossy_tables_fail_instead_of_dropping_entries() {
    let mut settings = lua_settings();
    settings.load_json(br#"{"servers": ["x"], "list": ["y"]}"#).unwrap();
    let before = settings.to_json();

    for (source, location) in [
        (r#"return { servers = { "a", "b", default = "a" } }"#, "result.servers"),
        (r#"return { list = { [1] = "a", [3] = "c" } }"#, "result.list"),
        (r#"return { keys = { [1.5] = "x", [true] = 1 } }"#, "result.keys"),
        ("return { ratio = 0/0 }", "result.ratio"),
    ] {
        match settings.load_script(source).unwrap_err() {
            ConfigError::Script { message, .. } => {
                assert!(message.contains(location), "{source}: {message}")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(settings.to_json(), before, "store changed after {source}");
    }
}

#[test]
fn test_dense_tables_convert_in_full() {
    let mut settings = lua_settings();
    settings
        .load_script(r#"return { list = { [1] = "a", [2] = "b", [3] = "c" }, empty = {} }"#)
        .unwrap();
    assert_eq!(
        settings.raw_get("list").unwrap(),
        &json!(["a", "b", "c"])
    );
    assert_eq!(settings.raw_get("empty").unwrap(), &json!({}));
}

#[test]
fn test_script_error_names_file() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "bad.lua", "return nil + 1");

    let mut settings = lua_settings();
    let err = settings.load_file(&script).unwrap_err();
    match err {
        ConfigError::Script { chunk, .. } => assert!(chunk.ends_with("bad.lua")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_lua_file_without_engine() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "conf.lua", "return {}");

    let mut settings = Settings::new();
    let err = settings.load_file(&script).unwrap_err();
    assert!(matches!(err, ConfigError::NoScriptEngine));
}
