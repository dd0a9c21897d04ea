//! Error types for Lua script evaluation

use stratum_config::ConfigError;
use thiserror::Error;

/// Lua engine error type
#[derive(Error, Debug)]
pub enum LuaError {
    /// Interpreter error (syntax, runtime, memory)
    #[error("Lua error: {0}")]
    Runtime(#[from] mlua::Error),

    /// The script result has no lossless config-value form
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// A module name that `require` could never reach
    #[error("Invalid module name: {0:?}")]
    InvalidModuleName(String),
}

impl LuaError {
    /// Attach the chunk name and convert into a config load error
    pub fn in_chunk(self, chunk: &str) -> ConfigError {
        ConfigError::Script {
            chunk: chunk.to_string(),
            message: self.to_string(),
        }
    }
}
