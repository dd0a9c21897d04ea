//! Script engine seam
//!
//! Script sources are programs whose returned value becomes a config layer.
//! The store only sees this trait, so it never depends on a particular
//! interpreter. Implementations own every sandboxing decision: which
//! libraries a script can reach, what modules it may `require`, and how much
//! memory it may use.

use crate::error::Result;
use crate::value::Value;

/// Evaluates script source into a value
pub trait ScriptEngine: Send + Sync {
    /// Short name of the engine, for logs
    fn name(&self) -> &str;

    /// Run `source` and return the value it produces
    ///
    /// `chunk_name` labels the source in error messages (usually the file
    /// path). A script that produces nothing should yield [`Value::Null`].
    /// Evaluation must not leave state behind for later calls.
    fn evaluate(&self, source: &str, chunk_name: &str) -> Result<Value>;
}
