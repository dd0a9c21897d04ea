//! The layered settings store
//!
//! [`Settings`] owns a single root tree. Each load parses or evaluates a
//! source into a tree and merges it over what is already there, so the
//! order of loads defines precedence: later sources win for scalars and
//! arrays, tables accumulate keys.
//!
//! ```rust
//! use stratum_config::Settings;
//!
//! let mut settings = Settings::new();
//! settings.load_json(br#"{"server": {"port": 80, "host": "localhost"}}"#)?;
//! settings.load_json(br#"{"server": {"port": 8080}}"#)?;
//!
//! assert_eq!(settings.get_int("server:port", 0).value(), 8080);
//! assert_eq!(settings.get_string("server:host", "").value(), "localhost");
//! # Ok::<(), stratum_config::ConfigError>(())
//! ```

use crate::accessor::{self, Lookup};
use crate::error::{ConfigError, Result};
use crate::format::{parse_tree, Format};
use crate::merge::merge_trees;
use crate::path::{self, ConfigPath};
use crate::script::ScriptEngine;
use crate::value::{into_tree, Tree, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Label used for in-memory sources in errors and logs
const BYTES_SOURCE: &str = "<bytes>";
const INLINE_SCRIPT: &str = "<inline>";

/// Hierarchical configuration store
#[derive(Clone, Default)]
pub struct Settings {
    settings: Tree,
    engine: Option<Arc<dyn ScriptEngine>>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("settings", &self.settings)
            .field("engine", &self.engine.as_ref().map(|e| e.name()))
            .finish()
    }
}

impl Settings {
    /// Create an empty store with no script engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that evaluates script sources with `engine`
    pub fn with_script_engine(engine: impl ScriptEngine + 'static) -> Self {
        Self {
            settings: Tree::new(),
            engine: Some(Arc::new(engine)),
        }
    }

    /// Attach or replace the script engine
    pub fn set_script_engine(&mut self, engine: impl ScriptEngine + 'static) {
        self.engine = Some(Arc::new(engine));
    }

    /// Borrow the root tree
    pub fn tree(&self) -> &Tree {
        &self.settings
    }

    /// Whether nothing has been loaded or set yet
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Merge a tree over the current settings
    pub fn merge(&mut self, incoming: Tree) {
        debug!("Merging {} top-level keys", incoming.len());
        merge_trees(&mut self.settings, incoming);
    }

    /// Load an in-memory source of the given format
    pub fn load_bytes(&mut self, data: &[u8], format: Format) -> Result<()> {
        self.load_source(data, format, BYTES_SOURCE)
    }

    /// Load a JSON document
    pub fn load_json(&mut self, data: &[u8]) -> Result<()> {
        self.load_bytes(data, Format::Json)
    }

    /// Load a JSON file
    pub fn load_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.load_path(path, Format::Json)
    }

    /// Load a file, choosing the loader from its extension
    ///
    /// `.json`, `.toml`, `.yaml`/`.yml` and `.lua` are recognised; anything
    /// else is [`ConfigError::UnknownFormat`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format =
            Format::from_path(path).ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;
        self.load_path(path, format)
    }

    /// Evaluate an inline script and merge the table it returns
    pub fn load_script(&mut self, source: &str) -> Result<()> {
        let tree = self.evaluate_script(source, INLINE_SCRIPT)?;
        self.merge(tree);
        Ok(())
    }

    /// Evaluate a script file and merge the table it returns
    pub fn load_script_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.load_path(path, Format::Lua)
    }

    fn load_path(&mut self, path: &Path, format: Format) -> Result<()> {
        info!("Loading {} config from {}", format, path.display());
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_source(&data, format, &path.to_string_lossy())
    }

    fn load_source(&mut self, data: &[u8], format: Format, source_name: &str) -> Result<()> {
        let tree = if format.is_script() {
            let source = std::str::from_utf8(data).map_err(|e| ConfigError::Parse {
                format: format.name(),
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
            self.evaluate_script(source, source_name)?
        } else {
            parse_tree(data, format, source_name)?
        };

        debug!("Loaded {} keys from {} ({})", tree.len(), source_name, format);
        self.merge(tree);
        Ok(())
    }

    fn evaluate_script(&self, source: &str, chunk_name: &str) -> Result<Tree> {
        let engine = self.engine.as_ref().ok_or(ConfigError::NoScriptEngine)?;
        debug!("Evaluating {} with {} engine", chunk_name, engine.name());

        let value = engine.evaluate(source, chunk_name)?;
        into_tree(value).map_err(|found| {
            warn!("Script {} returned {} instead of a table", chunk_name, found);
            ConfigError::NotATree {
                source_name: chunk_name.to_string(),
                found,
            }
        })
    }

    // ------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------

    /// Get the value at a colon-delimited path
    pub fn raw_get(&self, path: &str) -> Result<&Value> {
        path::lookup(&self.settings, &ConfigPath::parse(path))
    }

    /// Set the value at a colon-delimited path, creating tables on the way
    ///
    /// When a navigation segment holds something other than a table, `timid`
    /// decides: `true` returns [`ConfigError::PathConflict`] and changes
    /// nothing, `false` replaces that value with an empty table.
    pub fn raw_set(&mut self, timid: bool, path: &str, value: impl Into<Value>) -> Result<()> {
        path::assign(&mut self.settings, &ConfigPath::parse(path), timid, value.into())
    }

    // ------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------

    /// Decode the value at `path` into `T`
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let raw = self.raw_get(path)?;
        accessor::decode(path, raw)
    }

    /// Decode the value at `path` over `target`
    ///
    /// Fields the stored value does not mention keep their current values.
    /// On any error `target` is left as it was.
    pub fn get_into<T>(&self, path: &str, target: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = self.raw_get(path)?;
        accessor::decode_into(path, raw, target)
    }

    /// Get a bool, falling back to `default`
    pub fn get_bool(&self, path: &str, default: bool) -> Lookup<bool> {
        let result = self.raw_get(path).and_then(|v| accessor::as_bool(path, v));
        Lookup::resolve(result, default)
    }

    /// Get a string, falling back to `default`
    pub fn get_string(&self, path: &str, default: impl Into<String>) -> Lookup<String> {
        let result = self.raw_get(path).and_then(|v| accessor::as_string(path, v));
        Lookup::resolve(result, default.into())
    }

    /// Get an integer, falling back to `default`
    pub fn get_int(&self, path: &str, default: i64) -> Lookup<i64> {
        let result = self.raw_get(path).and_then(|v| accessor::as_int(path, v));
        Lookup::resolve(result, default)
    }

    /// Get a float, falling back to `default`
    pub fn get_float(&self, path: &str, default: f64) -> Lookup<f64> {
        let result = self.raw_get(path).and_then(|v| accessor::as_float(path, v));
        Lookup::resolve(result, default)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Compact JSON of the whole tree
    ///
    /// Useful to keep a static copy of the settings for later.
    pub fn to_json(&self) -> Vec<u8> {
        self.write_json(serde_json::ser::CompactFormatter)
    }

    /// Pretty JSON of the whole tree
    ///
    /// Every line after the first starts with `prefix`, and nesting is
    /// indented with `indent`.
    pub fn to_pretty_json(&self, prefix: &str, indent: &str) -> Vec<u8> {
        let pretty = self.write_json(serde_json::ser::PrettyFormatter::with_indent(
            indent.as_bytes(),
        ));
        if prefix.is_empty() {
            return pretty;
        }

        let mut out = Vec::with_capacity(pretty.len());
        for byte in pretty {
            out.push(byte);
            if byte == b'\n' {
                out.extend_from_slice(prefix.as_bytes());
            }
        }
        out
    }

    /// Print the settings as pretty JSON on stdout
    pub fn print(&self) {
        println!("{}", self);
    }

    fn write_json<F: serde_json::ser::Formatter>(&self, formatter: F) -> Vec<u8> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        // String-keyed JSON values have no failing serialization path.
        self.settings
            .serialize(&mut serializer)
            .expect("configuration tree is always serializable");
        out
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = self.to_pretty_json("", "  ");
        f.write_str(&String::from_utf8_lossy(&pretty))
    }
}
