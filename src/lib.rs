//! luascript - Lua scripting for a block-game server host
//!
//! Loads server and client Lua scripts, lets them listen to host events,
//! register chat commands and define shaped crafting recipes.

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod script;

pub use config::Config;
pub use error::{BridgeError, InstallError, RecipeError, Result, ScriptError};
pub use script::{
    ApplyReport, EngineManager, EngineState, FireReport, HostObject, HostValue, LoadReport,
};
