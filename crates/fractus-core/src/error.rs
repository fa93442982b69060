/// Core error types for the Fractus compiler.
use std::path::PathBuf;

/// A specialized Result type for Fractus operations.
pub type FractusResult<T> = Result<T, FractusError>;

/// Top-level error type encompassing all Fractus subsystems.
#[derive(Debug, thiserror::Error)]
pub enum FractusError {
    #[error("lex error: unknown command '\\{command}' at character {offset}")]
    UnknownCommand { command: String, offset: usize },

    #[error("parse error: {message} (in {source_name})")]
    Parse { message: String, source_name: String },

    #[error("compile error: {0}")]
    Compile(String),

    #[error("config error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("unknown color map: {0}")]
    UnknownColorMap(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FractusError {
    /// Create a parse error for the named source (e.g. "initial value").
    pub fn parse(message: impl Into<String>, source_name: impl Into<String>) -> Self {
        FractusError::Parse {
            message: message.into(),
            source_name: source_name.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        FractusError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}
