//! Deep merge of configuration trees
//!
//! Tables merge key by key, recursively. Every other value (scalars, arrays,
//! `null`) replaces whatever the existing tree holds at that key. Loading
//! sources in order therefore layers them: later scalars win, while tables
//! accumulate keys across loads.

use crate::value::{Tree, Value};

/// Merge `incoming` into `existing`, with `incoming` winning on conflicts
pub fn merge_trees(existing: &mut Tree, incoming: Tree) {
    for (key, value) in incoming {
        match value {
            Value::Object(incoming_table) => {
                let slot = existing
                    .entry(key)
                    .or_insert_with(|| Value::Object(Tree::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Tree::new());
                }
                if let Value::Object(existing_table) = slot {
                    merge_trees(existing_table, incoming_table);
                }
            }
            other => {
                existing.insert(key, other);
            }
        }
    }
}
