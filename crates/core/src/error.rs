use thiserror::Error;

/// Errors raised by the pure path and metadata helpers in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A `..` segment tried to climb above the storage root.
    #[error("path traversal detected: {0}")]
    PathTraversal(String),

    /// The path contains characters the store cannot address.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The path as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// A store-reported creation time could not be parsed.
    #[error("unparseable timestamp: '{0}'")]
    InvalidTimestamp(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            CoreError::PathTraversal("../etc".into()).to_string(),
            "path traversal detected: ../etc"
        );
        assert_eq!(
            CoreError::InvalidTimestamp("yesterday".into()).to_string(),
            "unparseable timestamp: 'yesterday'"
        );
        let err = CoreError::InvalidPath {
            path: "a\u{0}b".into(),
            reason: "control character".into(),
        };
        assert!(err.to_string().contains("control character"));
    }
}
