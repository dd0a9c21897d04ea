//! # Stratum Configuration Library
//!
//! A hierarchical configuration store. Sources are loaded in order and
//! deep-merged into one tree: later sources override earlier ones for
//! scalars and arrays, while tables accumulate keys across loads.
//!
//! ## Features
//!
//! - JSON, TOML and YAML sources (TOML/YAML behind default features)
//! - Script sources through the [`ScriptEngine`] trait (see `stratum-lua`)
//! - Colon-delimited paths: `"server:tls:cert"`
//! - Typed getters with default fallback, serde decoding into any type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stratum_config::Settings;
//!
//! let mut settings = Settings::new();
//! settings.load_file("defaults.json")?;
//! settings.load_file("local.toml")?;
//!
//! let port = settings.get_int("server:port", 8080).value();
//! let verbose = settings.get_bool("log:verbose", false).value();
//! # Ok::<(), stratum_config::ConfigError>(())
//! ```
//!
//! The store is a plain mutable value with no internal locking; share it
//! across threads only behind your own synchronisation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
mod error;
pub mod format;
pub mod merge;
pub mod path;
mod script;
mod settings;
pub mod value;

pub use accessor::Lookup;
pub use error::{ConfigError, Result};
pub use format::Format;
pub use merge::merge_trees;
pub use path::ConfigPath;
pub use script::ScriptEngine;
pub use settings::Settings;
pub use value::{Tree, Value};
