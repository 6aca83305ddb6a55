use cirrus_store::StoreError;
use thiserror::Error;

/// Errors specific to the Cloudinary store.
///
/// These are internal errors that get converted into [`StoreError`] at the
/// [`AssetStore`](cirrus_store::AssetStore) boundary.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered 404.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("Cloudinary API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered HTTP 429 (Too Many Requests).
    #[error("rate limited by Cloudinary")]
    RateLimited,

    /// A success response whose body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The configuration cannot produce a working client.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<CloudinaryError> for StoreError {
    fn from(err: CloudinaryError) -> Self {
        match err {
            CloudinaryError::Http(e) if e.is_timeout() => StoreError::Timeout,
            CloudinaryError::Http(e) if e.is_decode() => StoreError::InvalidResponse(e.to_string()),
            CloudinaryError::Http(e) => StoreError::Connection(e.to_string()),
            CloudinaryError::NotFound(msg) => StoreError::NotFound(msg),
            CloudinaryError::Api { status, message } => StoreError::Api { status, message },
            CloudinaryError::RateLimited => StoreError::RateLimited,
            CloudinaryError::InvalidResponse(msg) => StoreError::InvalidResponse(msg),
            CloudinaryError::InvalidConfig(msg) => StoreError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_retryable() {
        let store_err: StoreError = CloudinaryError::RateLimited.into();
        assert!(store_err.is_retryable());
        assert!(matches!(store_err, StoreError::RateLimited));
    }

    #[test]
    fn not_found_stays_distinct() {
        let store_err: StoreError = CloudinaryError::NotFound("Resource not found".into()).into();
        assert!(store_err.is_not_found());
    }

    #[test]
    fn api_error_keeps_status() {
        let store_err: StoreError = CloudinaryError::Api {
            status: 401,
            message: "Invalid Signature".into(),
        }
        .into();
        assert!(!store_err.is_retryable());
        assert!(matches!(store_err, StoreError::Api { status: 401, .. }));
    }

    #[test]
    fn invalid_config_maps_to_configuration() {
        let store_err: StoreError = CloudinaryError::InvalidConfig("no cloud".into()).into();
        assert!(matches!(store_err, StoreError::Configuration(_)));
    }

    #[test]
    fn error_display() {
        let err = CloudinaryError::Api {
            status: 400,
            message: "Invalid public_id".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cloudinary API error (HTTP 400): Invalid public_id"
        );
    }
}
