//! Lua scripting bridge.
//!
//! Scripts under the script root register event listeners, commands and
//! shaped recipes through the `_REGISTRY` binding (usually via the generated
//! `api.lua` shim). The host drives everything through [`EngineManager`].

pub mod binding;
pub mod bridge;
pub mod commands;
pub mod engine;
pub mod events;
pub mod install;
pub mod loader;
pub mod manager;
pub mod recipes;
pub mod types;

pub use binding::{shim_source, Registries, RegistryBinding};
pub use bridge::{HostObject, HostValue};
pub use commands::CommandRegistry;
pub use engine::ScriptEngine;
pub use events::EventRegistry;
pub use loader::{ScriptLoader, CLIENT_DIR, SERVER_DIR};
pub use manager::{EngineManager, EngineState};
pub use recipes::{parse_shaped, ApplyState, RecipeRegistry, ShapedRecipeData};
pub use types::{ApplyReport, FireReport, LoadOutcome, LoadReport};
