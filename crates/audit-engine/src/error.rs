//! Error types for the diff engine
//!
//! The diff pipeline itself never fails; errors come from:
//! - Loading or validating configuration
//! - Decoding revision history input
//! - Reading input files

use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration TOML could not be parsed
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML
    #[error("configuration serialization failed: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Revision history JSON could not be decoded
    #[error("invalid revision history: {0}")]
    InvalidHistory(#[from] serde_json::Error),

    /// Input file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create I/O error for `path`
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
