//! Error types for the lintprof library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using lintprof's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, analysing or measuring lint stats.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The stats file is not the JSON shape the linter produces.
    #[error("Malformed stats file {path}: {message}")]
    MalformedInput { path: PathBuf, message: String },

    /// No record in a non-empty stats file carries timing data.
    #[error(
        "No performance data found in {path}. Re-run the linter with the `--stats` flag \
         (for example `npx eslint --stats -f json . > stats.json`) or use `lintprof measure`."
    )]
    MissingStats { path: PathBuf },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The linter process could not be started.
    #[error("Failed to launch `{command}`: {message}")]
    Launch { command: String, message: String },

    /// Raw terminal setup or input failed.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl Error {
    /// Create a malformed input error for the given file.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a launch error for the given command line.
    pub fn launch(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Launch {
            command: command.into(),
            message: message.into(),
        }
    }
}
