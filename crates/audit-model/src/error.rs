//! Error types for the revision model

/// Errors decoding structured payloads out of revision content
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A content field had an unexpected shape
    #[error("malformed `{field}` in revision content: {source}")]
    Decode {
        /// Content key that failed to decode
        field: &'static str,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },
}

impl ModelError {
    /// Create decode error for field
    pub fn decode(field: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { field, source }
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
