//! Tree and value model
//!
//! Configuration data is a tree of tables. A [`Value`] is the tagged variant
//! `Null | Bool | Number | String | Array | Object`; a [`Tree`] is the table
//! type that every non-leaf node reachable from the root must be.

pub use serde_json::Value;

/// A table of string keys to values
pub type Tree = serde_json::Map<String, Value>;

/// Human-readable name of a value's variant, used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

/// Accept a freshly loaded top-level value as a tree
///
/// `null` is treated as an empty source. Any other non-table value is rejected,
/// returning the type name of what was found.
pub(crate) fn into_tree(value: Value) -> std::result::Result<Tree, &'static str> {
    match value {
        Value::Object(tree) => Ok(tree),
        Value::Null => Ok(Tree::new()),
        other => Err(type_name(&other)),
    }
}
