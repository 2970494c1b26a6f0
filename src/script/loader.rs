//! Script discovery and loading from the script root.

use std::fs;
use std::path::{Path, PathBuf};

use super::engine::ScriptEngine;
use super::types::LoadOutcome;
use crate::Result;

/// Subdirectory holding server-side scripts.
pub const SERVER_DIR: &str = "server";
/// Subdirectory holding client-side scripts.
pub const CLIENT_DIR: &str = "client";

/// Finds and runs script files under one root directory.
pub struct ScriptLoader {
    root: PathBuf,
    extension: String,
}

impl ScriptLoader {
    pub fn new<P: AsRef<Path>>(root: P, extension: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `root/sub` (and any parents) if missing.
    pub fn ensure_dir(&self, sub: &str) -> Result<()> {
        let dir = self.root.join(sub);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Script files directly inside `root/sub`, sorted by file name.
    ///
    /// A missing or unreadable folder yields no files.
    pub fn list_scripts(&self, sub: &str) -> Vec<PathBuf> {
        let entries = match fs::read_dir(self.root.join(sub)) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.has_script_extension(path))
            .collect();
        files.sort();
        files
    }

    /// Run every script in `root/sub`. One file failing never stops the rest.
    pub fn load_folder(&self, engine: &ScriptEngine, sub: &str) -> Vec<LoadOutcome> {
        self.list_scripts(sub)
            .into_iter()
            .map(|path| self.load_file(engine, &path))
            .collect()
    }

    /// Run one script file.
    pub fn load_file(&self, engine: &ScriptEngine, path: &Path) -> LoadOutcome {
        let file = self.relative_name(path);
        let result = engine.exec_file(path, &file);
        LoadOutcome { file, result }
    }

    fn has_script_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }

    /// `path` relative to the root with `/` separators, for logs.
    fn relative_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
