//! Result types returned by the host-facing hooks.

use tracing::{error, info};

use crate::host::ResourceLocation;
use crate::ScriptError;

/// Outcome of loading one script file.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Path relative to the script root, e.g. `server/recipes.lua`.
    pub file: String,
    pub result: Result<(), ScriptError>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a reload pass over one or more script folders.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub outcomes: Vec<LoadOutcome>,
}

impl LoadReport {
    /// Number of files that loaded cleanly.
    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.loaded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ScriptError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(()) => None,
            Err(e) => Some((o.file.as_str(), e)),
        })
    }

    pub fn files(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.file.as_str()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Log every outcome; called once the whole folder has been folded.
    pub fn log(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(()) => info!("Loaded: {}", outcome.file),
                Err(e) => error!("Failed to load: {}: {}", outcome.file, e),
            }
        }
    }
}

impl Extend<LoadOutcome> for LoadReport {
    fn extend<I: IntoIterator<Item = LoadOutcome>>(&mut self, iter: I) {
        self.outcomes.extend(iter);
    }
}

/// Result of firing one event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FireReport {
    /// Callbacks that ran to completion.
    pub invoked: usize,
    /// Callbacks that raised.
    pub failed: usize,
}

/// Result of applying the pending recipe tasks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Ids of recipes installed, in task order.
    pub installed: Vec<ResourceLocation>,
    /// Tasks whose definition was invalid.
    pub rejected: usize,
    /// Tasks that failed unexpectedly while parsing or installing.
    pub failed: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.installed.len() + self.rejected + self.failed
    }
}
