//! Configuration module for luascript.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::host::ResourceLocation;
use crate::{Result, ScriptError};

/// Which registries are emptied before server scripts are re-run.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ReloadPolicy {
    /// Drop every event listener before reloading.
    #[serde(default)]
    pub events: bool,
    /// Drop every pending command before reloading.
    #[serde(default)]
    pub commands: bool,
    /// Drop every pending recipe task before reloading.
    #[serde(default)]
    pub recipes: bool,
}

/// Script root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsConfig {
    /// Root directory holding `server/`, `client/` and the shim file.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// File extension (without the dot) of loadable scripts.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// File name of the auto-generated API shim.
    #[serde(default = "default_shim_file")]
    pub shim_file: String,
    /// Global name the registry binding is exposed under.
    #[serde(default = "default_registry_global")]
    pub registry_global: String,
    /// Registries cleared on server reload.
    #[serde(default)]
    pub clear_before_reload: ReloadPolicy,
}

fn default_root() -> PathBuf {
    PathBuf::from("config/lua_script")
}

fn default_extension() -> String {
    "lua".to_string()
}

fn default_shim_file() -> String {
    "api.lua".to_string()
}

fn default_registry_global() -> String {
    "_REGISTRY".to_string()
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            shim_file: default_shim_file(),
            registry_global: default_registry_global(),
            clear_before_reload: ReloadPolicy::default(),
        }
    }
}

impl ScriptsConfig {
    /// Config rooted at `root`, everything else default.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

/// Recipe installation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipesConfig {
    /// Namespace of every script-defined recipe id.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Compare-and-swap attempts before an install is abandoned.
    #[serde(default = "default_max_install_retries")]
    pub max_install_retries: usize,
}

fn default_namespace() -> String {
    "luascript".to_string()
}

fn default_max_install_retries() -> usize {
    8
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            max_install_retries: default_max_install_retries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/luascript.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Script root configuration.
    #[serde(default)]
    pub scripts: ScriptsConfig,
    /// Recipe configuration.
    #[serde(default)]
    pub recipes: RecipesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ScriptError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| ScriptError::Config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.scripts.extension.is_empty() {
            return Err(ScriptError::Config("scripts.extension is empty".to_string()));
        }
        if self.scripts.shim_file.is_empty() {
            return Err(ScriptError::Config("scripts.shim_file is empty".to_string()));
        }
        if self.scripts.registry_global.is_empty() {
            return Err(ScriptError::Config(
                "scripts.registry_global is empty".to_string(),
            ));
        }
        if !ResourceLocation::is_valid_namespace(&self.recipes.namespace) {
            return Err(ScriptError::Config(format!(
                "recipes.namespace '{}' is not a valid namespace",
                self.recipes.namespace
            )));
        }
        if self.recipes.max_install_retries == 0 {
            return Err(ScriptError::Config(
                "recipes.max_install_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
