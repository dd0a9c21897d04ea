//! Source formats and structured-data parsing
//!
//! JSON is always available. TOML and YAML sit behind the `toml` and `yaml`
//! features. Lua sources are recognised here but evaluated by a
//! [`ScriptEngine`](crate::ScriptEngine).

use crate::error::{ConfigError, Result};
use crate::value::{into_tree, Tree, Value};
use std::path::Path;

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON document
    Json,
    /// TOML document
    Toml,
    /// YAML document
    Yaml,
    /// Lua script returning a table
    Lua,
}

impl Format {
    /// Parse format from a name such as `"json"` or `"yml"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            "lua" => Some(Format::Lua),
            _ => None,
        }
    }

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
            Format::Lua => "lua",
        }
    }

    /// Whether sources of this format are evaluated rather than parsed
    pub fn is_script(&self) -> bool {
        matches!(self, Format::Lua)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse structured data into a tree
///
/// The top level must be a table; `null` yields an empty tree.
pub fn parse_tree(data: &[u8], format: Format, source_name: &str) -> Result<Tree> {
    let value = parse_value(data, format, source_name)?;
    into_tree(value).map_err(|found| ConfigError::NotATree {
        source_name: source_name.to_string(),
        found,
    })
}

fn parse_value(data: &[u8], format: Format, source_name: &str) -> Result<Value> {
    let parse_error = |message: String| ConfigError::Parse {
        format: format.name(),
        source_name: source_name.to_string(),
        message,
    };

    match format {
        Format::Json => serde_json::from_slice(data).map_err(|e| parse_error(e.to_string())),
        #[cfg(feature = "yaml")]
        Format::Yaml => serde_yaml::from_slice(data).map_err(|e| parse_error(e.to_string())),
        #[cfg(feature = "toml")]
        Format::Toml => {
            let text = std::str::from_utf8(data).map_err(|e| parse_error(e.to_string()))?;
            let table: toml::Table = toml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
            toml_to_json(toml::Value::Table(table), "", source_name)
        }
        #[allow(unreachable_patterns)]
        _ => Err(parse_error(format!(
            "{} sources are not structured data in this build",
            format
        ))),
    }
}

/// Convert a parsed TOML document into the config value model
///
/// Datetimes become their RFC 3339 text. Non-finite floats have no
/// counterpart and fail with a parse error naming the key.
#[cfg(feature = "toml")]
fn toml_to_json(value: toml::Value, at: &str, source_name: &str) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Float(f) => match serde_json::Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => {
                return Err(ConfigError::Parse {
                    format: Format::Toml.name(),
                    source_name: source_name.to_string(),
                    message: format!("{at} holds {f}, which has no JSON form"),
                })
            }
        },
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| toml_to_json(item, &format!("{at}[{i}]"), source_name))
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, item)| -> Result<(String, Value)> {
                    let child = if at.is_empty() {
                        key.clone()
                    } else {
                        format!("{at}:{key}")
                    };
                    Ok((key, toml_to_json(item, &child, source_name)?))
                })
                .collect::<Result<_>>()?,
        ),
    })
}
