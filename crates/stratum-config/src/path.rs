//! Colon-delimited path resolution
//!
//! A path such as `"server:tls:cert"` addresses the key `cert` inside the
//! table `tls` inside the table `server`. Every segment before the last is a
//! navigation key and must resolve to a table; the last segment is the
//! target key, read or written by the caller on the returned container.
//!
//! Segments are taken verbatim, so `"a::b"` navigates through a key named
//! `""` and `""` addresses the empty key at the root.

use crate::error::{ConfigError, Result};
use crate::value::{type_name, Tree, Value};
use tracing::debug;

/// Separator between path segments
pub const SEPARATOR: char = ':';

/// A parsed configuration path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath<'a> {
    raw: &'a str,
    parents: Vec<&'a str>,
    key: &'a str,
}

impl<'a> ConfigPath<'a> {
    /// Split a raw path into navigation segments and the target key
    pub fn parse(raw: &'a str) -> Self {
        let (parents, key) = match raw.rsplit_once(SEPARATOR) {
            Some((head, key)) => (head.split(SEPARATOR).collect(), key),
            None => (Vec::new(), raw),
        };
        Self { raw, parents, key }
    }

    /// The path as given
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Navigation segments, outermost first
    pub fn parents(&self) -> &[&'a str] {
        &self.parents
    }

    /// The final segment
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub(crate) fn not_found(&self, segment: &str) -> ConfigError {
        ConfigError::PathNotFound {
            path: self.raw.to_string(),
            segment: segment.to_string(),
        }
    }
}

/// Resolve the container table of `path` without modifying the tree
///
/// Fails on the first navigation segment that is absent or not a table.
pub fn resolve<'t>(root: &'t Tree, path: &ConfigPath<'_>) -> Result<&'t Tree> {
    let mut node = root;
    for segment in path.parents() {
        node = match node.get(*segment) {
            Some(Value::Object(child)) => child,
            _ => return Err(path.not_found(segment)),
        };
    }
    Ok(node)
}

/// Look up the value addressed by `path`
///
/// An explicit `null` leaf reads as absent.
pub fn lookup<'t>(root: &'t Tree, path: &ConfigPath<'_>) -> Result<&'t Value> {
    let container = resolve(root, path)?;
    match container.get(path.key()) {
        Some(Value::Null) | None => Err(path.not_found(path.key())),
        Some(value) => Ok(value),
    }
}

/// Resolve the container table of `path`, creating missing tables
///
/// Absent navigation keys always get a fresh empty table. A navigation key
/// holding a non-table value is an error when `timid` is set; otherwise the
/// value is replaced by an empty table. Conflicts can only sit on the part of
/// the path that already exists, so a timid failure leaves the tree as it was.
pub fn resolve_mut<'t>(root: &'t mut Tree, path: &ConfigPath<'_>, timid: bool) -> Result<&'t mut Tree> {
    let mut node = root;
    for segment in path.parents() {
        let slot = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Tree::new()));

        if !slot.is_object() {
            if timid {
                return Err(ConfigError::PathConflict {
                    path: path.as_str().to_string(),
                    segment: segment.to_string(),
                    found: type_name(slot),
                });
            }
            debug!(
                "Replacing {} at segment '{}' of {} with a table",
                type_name(slot),
                segment,
                path.as_str()
            );
            *slot = Value::Object(Tree::new());
        }

        node = match slot {
            Value::Object(child) => child,
            _ => unreachable!("navigation slot was just made a table"),
        };
    }
    Ok(node)
}

/// Store `value` at `path`, creating intermediate tables as needed
pub fn assign(root: &mut Tree, path: &ConfigPath<'_>, timid: bool, value: Value) -> Result<()> {
    let container = resolve_mut(root, path, timid)?;
    container.insert(path.key().to_string(), value);
    Ok(())
}
