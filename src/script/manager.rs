//! Lifecycle owner of the Lua state and the script registries.
//!
//! The host builds one [`EngineManager`] at startup and calls its hooks from
//! the thread that owns it: `init` once the game directory is known, the
//! reload hooks when scripts should run, `register_commands` whenever the
//! command tree is rebuilt, `apply_recipes` whenever recipes are reloaded,
//! and `fire` from its event handlers.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::binding::{shim_source, Registries, RegistryBinding};
use super::bridge::HostValue;
use super::engine::ScriptEngine;
use super::loader::{ScriptLoader, CLIENT_DIR, SERVER_DIR};
use super::types::{ApplyReport, FireReport, LoadReport};
use crate::config::{Config, ScriptsConfig};
use crate::host::{CommandDispatcher, ItemRegistry, RecipeStorage};
use crate::{Result, ScriptError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
}

pub struct EngineManager {
    config: ScriptsConfig,
    registries: Rc<Registries>,
    loader: ScriptLoader,
    engine: Option<ScriptEngine>,
}

impl EngineManager {
    pub fn new(config: &Config) -> Self {
        Self {
            registries: Rc::new(Registries::new(&config.recipes)),
            loader: ScriptLoader::new(&config.scripts.root, &config.scripts.extension),
            config: config.scripts.clone(),
            engine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        if self.engine.is_some() {
            EngineState::Initialized
        } else {
            EngineState::Uninitialized
        }
    }

    pub fn root(&self) -> &Path {
        self.loader.root()
    }

    pub fn shim_path(&self) -> PathBuf {
        self.root().join(&self.config.shim_file)
    }

    pub fn registries(&self) -> &Rc<Registries> {
        &self.registries
    }

    pub fn engine(&self) -> Result<&ScriptEngine> {
        self.engine.as_ref().ok_or(ScriptError::NotInitialized)
    }

    /// Create the Lua state, bind the registries and prepare the script root.
    ///
    /// Calling this again keeps the existing Lua state; only the directories
    /// and a missing shim are recreated.
    pub fn init(&mut self) -> Result<()> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let engine = ScriptEngine::new()?;
                engine.set_global(
                    &self.config.registry_global,
                    RegistryBinding::new(Rc::clone(&self.registries)),
                )?;
                info!("Lua engine created");
                engine
            }
        };
        // keep the state even if the filesystem steps below fail
        self.engine = Some(engine);

        self.loader.ensure_dir(SERVER_DIR)?;
        self.loader.ensure_dir(CLIENT_DIR)?;
        self.write_shim_if_missing()?;
        Ok(())
    }

    fn write_shim_if_missing(&self) -> Result<()> {
        let path = self.shim_path();
        if path.exists() {
            debug!(path = %path.display(), "API shim already present");
            return Ok(());
        }
        fs::write(&path, shim_source(&self.config.registry_global))?;
        info!("Generated API shim at {}", path.display());
        Ok(())
    }

    /// Re-run the shim and every server script.
    pub fn reload_server_scripts(&self) -> LoadReport {
        let Some(engine) = &self.engine else {
            warn!("Server script reload requested before the engine was initialized");
            return LoadReport::default();
        };

        self.clear_for_reload();

        let mut report = LoadReport::default();
        let shim = self.shim_path();
        if shim.is_file() {
            report.extend([self.loader.load_file(engine, &shim)]);
        }
        report.extend(self.loader.load_folder(engine, SERVER_DIR));
        report.log();
        report
    }

    /// Re-run every client script. Registries are left as they are.
    pub fn reload_client_scripts(&self) -> LoadReport {
        let Some(engine) = &self.engine else {
            warn!("Client script reload requested before the engine was initialized");
            return LoadReport::default();
        };

        let mut report = LoadReport::default();
        report.extend(self.loader.load_folder(engine, CLIENT_DIR));
        report.log();
        report
    }

    fn clear_for_reload(&self) {
        let policy = &self.config.clear_before_reload;
        if policy.events {
            self.registries.events.clear();
        }
        if policy.commands {
            self.registries.commands.clear();
        }
        if policy.recipes {
            self.registries.recipes.clear();
        }
        debug!(
            events = policy.events,
            commands = policy.commands,
            recipes = policy.recipes,
            "applied reload policy"
        );
    }

    /// Deliver a host event to script listeners.
    pub fn fire(&self, event_name: &str, data: impl Into<HostValue>) -> FireReport {
        match &self.engine {
            Some(engine) => self
                .registries
                .events
                .fire(engine.lua(), event_name, data.into()),
            None => {
                warn!(event = event_name, "event fired before the engine was initialized");
                FireReport::default()
            }
        }
    }

    /// Install script commands into a freshly built command tree.
    pub fn register_commands(&self, dispatcher: &mut dyn CommandDispatcher) -> usize {
        match &self.engine {
            Some(engine) => self
                .registries
                .commands
                .register_all(engine.lua(), dispatcher),
            None => {
                warn!("Command registration requested before the engine was initialized");
                0
            }
        }
    }

    /// Run the pending recipe tasks against the host tables.
    pub fn apply_recipes(
        &self,
        items: &dyn ItemRegistry,
        storage: &dyn RecipeStorage,
    ) -> ApplyReport {
        self.registries.recipes.apply(items, storage)
    }
}
