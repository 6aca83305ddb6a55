use serde::Deserialize;

use crate::error::CloudinaryError;
use crate::signing::SignatureAlgorithm;

const URL_SCHEME: &str = "cloudinary://";

/// Configuration for the Cloudinary asset store.
#[derive(Clone, Deserialize)]
pub struct CloudinaryConfig {
    /// Cloud name, the first path segment of every API and delivery URL.
    pub cloud_name: String,

    /// API key, sent with signed requests and as the basic-auth user.
    pub api_key: String,

    /// API secret used to sign Upload API requests and as the basic-auth
    /// password for the Admin API.
    pub api_secret: String,

    /// Build `https` delivery URLs.
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Base URL for the Upload and Admin APIs. Override this for testing
    /// against a mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Host serving delivery URLs.
    #[serde(default = "default_delivery_host")]
    pub delivery_host: String,

    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Digest for Upload API signatures. Must match the account setting.
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
}

fn default_secure() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://api.cloudinary.com".to_owned()
}

fn default_delivery_host() -> String {
    "res.cloudinary.com".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("secure", &self.secure)
            .field("api_base_url", &self.api_base_url)
            .field("delivery_host", &self.delivery_host)
            .field("timeout_secs", &self.timeout_secs)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl CloudinaryConfig {
    /// Create a new configuration for the given cloud and credentials.
    ///
    /// Uses the public Cloudinary endpoints and `https` delivery.
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            secure: default_secure(),
            api_base_url: default_api_base_url(),
            delivery_host: default_delivery_host(),
            timeout_secs: default_timeout_secs(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    /// Parse a `cloudinary://{api_key}:{api_secret}@{cloud_name}` URL, the
    /// format Cloudinary hands out as `CLOUDINARY_URL`.
    pub fn from_url(url: &str) -> Result<Self, CloudinaryError> {
        let invalid = || CloudinaryError::InvalidConfig(format!("malformed Cloudinary URL: {url}"));

        let rest = url.trim().strip_prefix(URL_SCHEME).ok_or_else(invalid)?;
        let (credentials, cloud_name) = rest.rsplit_once('@').ok_or_else(invalid)?;
        let (api_key, api_secret) = credentials.split_once(':').ok_or_else(invalid)?;
        let cloud_name = cloud_name.trim_end_matches('/');
        if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(cloud_name, api_key, api_secret))
    }

    /// Reject configurations that cannot produce a working client.
    pub fn validate(&self) -> Result<(), CloudinaryError> {
        for (field, value) in [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(CloudinaryError::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(CloudinaryError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Choose between `https` and `http` delivery URLs.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the delivery host (for example a private CDN distribution).
    #[must_use]
    pub fn with_delivery_host(mut self, host: impl Into<String>) -> Self {
        self.delivery_host = host.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }
}
