use crate::source::SourceError;
use thiserror::Error;

/// A comprehensive error type for the whole report compilation run.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Configuration is invalid: {0}")]
    Config(String),

    #[error("Site manifest unavailable: {0}")]
    Source(#[from] SourceError),

    #[error("Report for viewport '{viewport}' failed: {message}")]
    Assembly { viewport: String, message: String },

    #[error("Worker task failed: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for CompileError {
    fn from(e: serde_yaml::Error) -> Self {
        CompileError::Config(e.to_string())
    }
}
