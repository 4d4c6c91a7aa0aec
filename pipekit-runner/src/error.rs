//! Error types for the run lifecycle

use pipekit_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for run lifecycle operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that abort a test invocation
///
/// Platform lookup failures during enrichment never surface here; they are
/// logged and the run continues.
#[derive(Debug, Error)]
pub enum RunError {
    /// No pipeline directory with a `config.toml` was found
    #[error("Pipeline '{name}' not found under {search_path} (no directory with a config.toml)")]
    PipelineNotFound { name: String, search_path: PathBuf },

    /// The pipeline's static configuration is missing a required field
    #[error("Invalid pipeline config {path}: {message}")]
    InvalidPipelineConfig { path: PathBuf, message: String },

    /// An explicitly requested run config file does not exist
    #[error("Run config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    /// A config file on disk could not be parsed
    #[error("Malformed config file {path}: {source}")]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The run directory chosen for allocation already exists
    #[error("Run directory {0} already exists; runs/ was modified during allocation")]
    RunDirExists(PathBuf),

    /// No run index is left above the highest one in use
    #[error("No run index left in {0}; remove or fix runs/.last_index and the highest run directories")]
    RunIndexExhausted(PathBuf),

    /// An external command could not be started
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command exited with a non-zero status
    #[error("'{program}' exited with code {code}")]
    ProcessFailed { program: String, code: i32 },

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run config could not be serialized
    #[error("Failed to serialize run config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Environment configuration is missing or invalid
    #[error("Environment configuration error: {0}")]
    Env(String),

    /// Reading an answer from the user failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Platform request failed outside of enrichment
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code to report for this error
    ///
    /// A failed pipeline process propagates its own exit code; everything
    /// else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProcessFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}
