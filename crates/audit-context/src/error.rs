//! Error types for diff collaborators
//!
//! Covers the two calls that leave the process:
//! - Person batch fetches
//! - Stub resolution of related objects

use audit_model::ObjectKey;

/// Collaborator failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContextError {
    /// Person batch fetch failed
    #[error("person fetch failed: {0}")]
    PersonFetch(String),

    /// Related object is unknown to the resolver
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectKey),

    /// Resolver backend failed
    #[error("object resolution failed for {key}: {message}")]
    Resolution {
        /// Object being resolved
        key: ObjectKey,
        /// Backend message
        message: String,
    },
}

impl ContextError {
    /// Create resolution error for key
    pub fn resolution(key: ObjectKey, message: impl Into<String>) -> Self {
        Self::Resolution {
            key,
            message: message.into(),
        }
    }
}

/// Result type alias for collaborator operations
pub type ContextResult<T> = Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = ContextError::ObjectNotFound(ObjectKey::new("Control", 3));
        assert_eq!(err.to_string(), "object not found: Control #3");
    }

    #[test]
    fn resolution_display() {
        let err = ContextError::resolution(ObjectKey::new("Risk", 1), "503");
        assert!(err.to_string().contains("Risk #1: 503"));
    }
}
