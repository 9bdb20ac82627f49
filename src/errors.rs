//! Custom error types for the postura pipeline.
//!
//! Errors only exist on the I/O boundary: loading inputs, writing artifacts.
//! The scoring and gating core is pure and infallible (missing lookups
//! degrade to documented defaults instead of raising).

use std::path::PathBuf;

/// The main error type for postura operations.
#[derive(Debug, thiserror::Error)]
pub enum PosturaError {
    /// I/O error (file read/write, permissions, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error (tenant model, policies, serverless manifest)
    #[error("YAML error in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid path error
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Result type alias using PosturaError
pub type PosturaResult<T> = Result<T, PosturaError>;

impl PosturaError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a YAML error with path context
    pub fn yaml(source: serde_yaml::Error, path: impl Into<PathBuf>) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for PosturaError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
