//! Error types for luascript.

use thiserror::Error;

/// Failure while reading a script value as a host-native value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The value is absent or has the wrong type.
    #[error("type error: field '{field}' expected {expected}, got {found}")]
    TypeError {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// A required field is missing entirely.
    #[error("missing field '{0}'")]
    MissingField(String),
}

/// Validation failure in a script-declared recipe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    #[error("Missing '{0}' field")]
    MissingField(&'static str),

    #[error("Unknown output item: {0}")]
    UnknownOutput(String),

    #[error("Unknown ingredient item: {0}")]
    UnknownIngredient(String),

    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Count must be at least 1, got {0}")]
    InvalidCount(i64),

    #[error("Key must be a single character: {0}")]
    InvalidKey(String),

    #[error("Pattern cannot be empty")]
    EmptyPattern,

    #[error("Pattern rows must have same width (row {row} has {found}, expected {expected})")]
    RaggedPattern {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown symbol in pattern: '{0}'")]
    UnknownSymbol(char),
}

/// Failure while merging a parsed recipe into host storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("invalid recipe id '{0}'")]
    InvalidId(String),

    #[error("recipe storage kept changing, gave up after {0} attempts")]
    Contended(usize),
}

/// Common error type for luascript.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the Lua runtime (syntax or runtime).
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// Value conversion error.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Recipe definition error.
    #[error("recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Recipe installation error.
    #[error("install error: {0}")]
    Install(#[from] InstallError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine has not been initialized yet.
    #[error("script engine is not initialized")]
    NotInitialized,
}

/// Result type alias for luascript operations.
pub type Result<T> = std::result::Result<T, ScriptError>;
