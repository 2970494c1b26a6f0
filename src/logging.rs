//! Subscriber setup.
//!
//! Script load failures, callback errors and recipe diagnostics are all
//! reported through `tracing`. Hosts call one of the two initializers once,
//! before [`EngineManager::init`](crate::EngineManager::init).

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

fn level_from_name(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` directives, with the configured level added on top.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_from_name(level).into())
}

/// Open `path` for appending, creating missing parent directories.
fn open_append(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log to stdout and to `config.file`.
///
/// The file is appended to, not truncated, so a script error from a previous
/// server run is still there after a restart.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file = Arc::new(open_append(Path::new(&config.file))?);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout.and(file))
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(&config.level))
        .init();
    Ok(())
}

/// Log to stdout only. Used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(env_filter(level))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_level_names() {
        let cases = [
            ("trace", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            (" Warn ", Level::WARN),
            ("warning", Level::WARN),
            ("ERROR", Level::ERROR),
            ("info", Level::INFO),
        ];
        for (name, expected) in cases {
            assert_eq!(level_from_name(name), expected, "{name}");
        }
    }

    #[test]
    fn test_unknown_level_is_info() {
        assert_eq!(level_from_name("verbose"), Level::INFO);
        assert_eq!(level_from_name(""), Level::INFO);
    }

    #[test]
    fn test_open_append_creates_dirs_and_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("luascript.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "earlier run\n").unwrap();

        {
            use std::io::Write;
            let mut file = open_append(&path).unwrap();
            writeln!(file, "this run").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\nthis run\n");

        let fresh = dir.path().join("other").join("new.log");
        open_append(&fresh).unwrap();
        assert!(fresh.is_file());
    }
}
