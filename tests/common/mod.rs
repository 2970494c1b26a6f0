//! Test helpers for integration tests.
//!
//! Provides TestHost, an engine manager over a temporary script root wired
//! to the in-memory host implementations.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use luascript::config::{Config, ReloadPolicy, ScriptsConfig};
use luascript::host::{BufferedSource, ItemTable, RecipeManager, SimpleDispatcher};
use luascript::{ApplyReport, EngineManager};

/// A throwaway host: script root, item table, recipe storage and manager.
pub struct TestHost {
    pub dir: TempDir,
    pub manager: EngineManager,
    pub items: ItemTable,
    pub recipes: RecipeManager,
}

impl TestHost {
    /// Host with the default reload policy (nothing cleared).
    pub fn new() -> Self {
        Self::with_policy(ReloadPolicy::default())
    }

    /// Host whose server reload clears every registry.
    pub fn clearing() -> Self {
        Self::with_policy(ReloadPolicy {
            events: true,
            commands: true,
            recipes: true,
        })
    }

    pub fn with_policy(policy: ReloadPolicy) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.scripts = ScriptsConfig::with_root(dir.path().join("config").join("lua_script"));
        config.scripts.clear_before_reload = policy;

        Self {
            manager: EngineManager::new(&config),
            dir,
            items: ItemTable::vanilla(),
            recipes: RecipeManager::new(),
        }
    }

    /// Host already initialized.
    pub fn started() -> Self {
        let mut host = Self::new();
        host.manager.init().expect("init");
        host
    }

    pub fn root(&self) -> PathBuf {
        self.manager.root().to_path_buf()
    }

    pub fn write_server_script(&self, name: &str, source: &str) {
        self.write_script("server", name, source);
    }

    pub fn write_client_script(&self, name: &str, source: &str) {
        self.write_script("client", name, source);
    }

    fn write_script(&self, folder: &str, name: &str, source: &str) {
        let dir = self.root().join(folder);
        fs::create_dir_all(&dir).expect("create script folder");
        fs::write(dir.join(name), source).expect("write script");
    }

    pub fn apply_recipes(&self) -> ApplyReport {
        self.manager.apply_recipes(&self.items, &self.recipes)
    }

    /// Build a fresh command tree the way the host does on every reload.
    pub fn build_commands(&self) -> SimpleDispatcher {
        let mut dispatcher = SimpleDispatcher::new();
        self.manager.register_commands(&mut dispatcher);
        dispatcher
    }
}

/// Run `name` on `dispatcher` as `player`, returning the code and the source.
pub fn run_command(
    dispatcher: &SimpleDispatcher,
    name: &str,
    player: &str,
) -> (Option<i32>, Rc<BufferedSource>) {
    let source = Rc::new(BufferedSource::new(player));
    let code = dispatcher.execute(name, source.clone());
    (code, source)
}
