//! The Lua runtime instance.

use std::fs;
use std::path::Path;

use mlua::{FromLua, IntoLua, Lua, LuaOptions, StdLib};

use crate::Result;

/// A Lua state with the standard library loaded.
///
/// Scripts run with full host trust; nothing is removed from the globals.
pub struct ScriptEngine {
    lua: Lua,
}

impl ScriptEngine {
    pub fn new() -> Result<Self> {
        let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())?;
        Ok(Self { lua })
    }

    /// Execute Lua source. `chunk_name` shows up in error messages.
    pub fn execute(&self, source: &str, chunk_name: &str) -> Result<()> {
        self.lua
            .load(source)
            .set_name(format!("@{chunk_name}"))
            .exec()?;
        Ok(())
    }

    /// Read and execute a script file against the shared globals.
    pub fn exec_file(&self, path: &Path, chunk_name: &str) -> Result<()> {
        let source = fs::read_to_string(path)?;
        self.execute(&source, chunk_name)
    }

    pub fn set_global<V: IntoLua>(&self, name: &str, value: V) -> Result<()> {
        self.lua.globals().set(name, value)?;
        Ok(())
    }

    pub fn get_global<V: FromLua>(&self, name: &str) -> Result<V> {
        Ok(self.lua.globals().get(name)?)
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}
