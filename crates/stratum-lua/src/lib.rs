//! Lua config sources for stratum
//!
//! Config files written in Lua are programs: they can compute values, read
//! helper modules and return a table that is merged like any other layer.
//!
//! ```lua
//! -- settings.lua
//! local json = require("json")
//! local base = json.decode('{"log": {"level": "info"}}')
//!
//! base.workers = {}
//! for i = 1, 4 do
//!     base.workers[i] = { name = "worker-" .. i }
//! end
//! return base
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! let mut settings = stratum_lua::lua_settings();
//! settings.load_file("defaults.json")?;
//! settings.load_file("settings.lua")?;
//! # Ok::<(), stratum_config::ConfigError>(())
//! ```
//!
//! ## Sandboxing
//!
//! Scripts get the safe standard libraries by default (no `debug`, no FFI).
//! [`LuaEngine::with_stdlib`] narrows that further and
//! [`LuaEngine::with_memory_limit`] caps allocation per evaluation.
//!
//! ## Feature Flags
//!
//! - `send`: Enable `Send+Sync` on Lua state for multi-threaded use

mod convert;
mod engine;
mod error;
pub mod json;

pub use convert::{lua_to_json, MAX_DEPTH};
pub use engine::{LuaEngine, ModuleLoader};
pub use error::LuaError;
pub use mlua;

use stratum_config::Settings;

/// Create an empty store wired to a default [`LuaEngine`]
pub fn lua_settings() -> Settings {
    Settings::with_script_engine(LuaEngine::new())
}
