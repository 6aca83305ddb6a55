use thiserror::Error;

/// Errors from remote asset store operations.
///
/// [`StoreError::NotFound`] is kept distinct from every other failure so
/// callers can turn a missing asset into `false` for existence checks.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested asset or folder does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store rejected the request.
    #[error("store API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport gave up waiting for the store.
    #[error("request timed out")]
    Timeout,

    /// The store throttled the request.
    #[error("rate limited")]
    RateLimited,

    /// The store answered with something that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The store client is misconfigured.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The caller cancelled the operation before the store answered.
    #[error("operation cancelled")]
    Cancelled,

    /// Reading a local upload source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the error is transient and the operation may
    /// succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_) | Self::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished() {
        assert!(StoreError::NotFound("a/b".into()).is_not_found());
        assert!(
            !StoreError::Api {
                status: 400,
                message: "bad".into()
            }
            .is_not_found()
        );
        assert!(!StoreError::Timeout.is_not_found());
    }

    #[test]
    fn retryable_errors() {
        assert!(StoreError::Timeout.is_retryable());
        assert!(StoreError::Connection("reset".into()).is_retryable());
        assert!(StoreError::RateLimited.is_retryable());
        assert!(!StoreError::Cancelled.is_retryable());
        assert!(!StoreError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = StoreError::Api {
            status: 401,
            message: "Invalid Signature".into(),
        };
        assert_eq!(err.to_string(), "store API error (HTTP 401): Invalid Signature");
        assert_eq!(StoreError::Cancelled.to_string(), "operation cancelled");
        assert_eq!(
            StoreError::NotFound("docs/a.pdf".into()).to_string(),
            "not found: docs/a.pdf"
        );
    }

    #[test]
    fn io_error_conversion() {
        let err: StoreError = std::io::Error::other("disk gone").into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.to_string().contains("disk gone"));
    }
}
