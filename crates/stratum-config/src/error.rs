//! Error types for configuration loading and access

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A navigation or final path segment does not exist
    #[error("Could not find {path} (missing {segment})")]
    PathNotFound {
        /// Full path that was requested
        path: String,
        /// First segment that could not be resolved
        segment: String,
    },

    /// A navigation segment holds a non-tree value and the set was timid
    #[error("Could not find {path} (segment {segment} holds {found}, not a table)")]
    PathConflict {
        /// Full path that was requested
        path: String,
        /// Segment whose value is in the way
        segment: String,
        /// Type name of the value found there
        found: &'static str,
    },

    /// The value exists but is not of the requested type
    #[error("{path} is not a {expected} (found {found})")]
    TypeMismatch {
        /// Path of the value
        path: String,
        /// Requested type
        expected: &'static str,
        /// Type name of the stored value
        found: &'static str,
    },

    /// Structured decode into a caller type failed
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// Path of the value
        path: String,
        /// Decoder message
        message: String,
    },

    /// IO error reading a source file
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path to the file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed structured-data source
    #[error("Parse error in {source_name} ({format}): {message}")]
    Parse {
        /// Format name the source was parsed as
        format: &'static str,
        /// File path or a label for in-memory sources
        source_name: String,
        /// Parser message
        message: String,
    },

    /// A source parsed, but its top level is not a table
    #[error("{source_name} must produce a table at the top level, got {found}")]
    NotATree {
        /// File path or a label for in-memory sources
        source_name: String,
        /// Type name of the top-level value
        found: &'static str,
    },

    /// Script evaluation or result conversion failed
    #[error("Script error in {chunk}: {message}")]
    Script {
        /// Chunk name (file path or inline label)
        chunk: String,
        /// Engine message
        message: String,
    },

    /// A script source was loaded but no engine is attached
    #[error("No script engine configured")]
    NoScriptEngine,

    /// The file extension does not map to a known loader
    #[error("Unable to determine config file type for path {}", .0.display())]
    UnknownFormat(PathBuf),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// True for errors in the path-not-found family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::PathNotFound { .. } | ConfigError::PathConflict { .. }
        )
    }

    /// True when a value was found but had the wrong shape
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            ConfigError::TypeMismatch { .. } | ConfigError::Decode { .. }
        )
    }

    /// True for failures raised while reading or evaluating a source
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ConfigError::Io { .. }
                | ConfigError::Parse { .. }
                | ConfigError::NotATree { .. }
                | ConfigError::Script { .. }
                | ConfigError::NoScriptEngine
        )
    }
}
