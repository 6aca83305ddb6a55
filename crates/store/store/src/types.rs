use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use cirrus_core::{RemoteAsset, ResourceCategory};
use futures::Stream;
use serde::{Deserialize, Serialize};

/// A boxed stream of byte chunks, used for streamed uploads and downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Where an upload's content comes from.
pub enum UploadSource {
    /// An in-memory payload.
    Bytes(Bytes),
    /// A stream forwarded to the store without buffering.
    Stream(ByteStream),
    /// A URL the store fetches itself (used for copies).
    Url(String),
}

impl UploadSource {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::Url(_) => "url",
        }
    }
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(<byte stream>)"),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

impl From<Bytes> for UploadSource {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// Upload flags forwarded to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Let the store derive naming from the original filename.
    pub use_filename: bool,

    /// Ask the store to append a random suffix to the public ID.
    pub unique_filename: bool,

    /// Original filename, sent with the file part.
    pub filename: Option<String>,
}

impl UploadOptions {
    /// Options used for filesystem writes: keep the caller's name, never
    /// add a random suffix.
    pub fn for_write(filename: impl Into<String>) -> Self {
        Self {
            use_filename: true,
            unique_filename: false,
            filename: Some(filename.into()),
        }
    }

    /// Extension of the original filename, if any.
    pub fn format(&self) -> Option<&str> {
        self.filename
            .as_deref()
            .and_then(|name| cirrus_core::PathInfo::parse(name).extension)
            .filter(|extension| !extension.is_empty())
    }
}

/// Result of a destroy call. The store answers `"ok"` or `"not found"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyOutcome {
    pub result: String,
}

impl DestroyOutcome {
    pub fn ok() -> Self {
        Self {
            result: "ok".to_owned(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            result: "not found".to_owned(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

/// One page request against the asset listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Public-ID prefix to filter by. Empty lists everything.
    pub prefix: String,
    /// Category whose assets are listed.
    pub category: ResourceCategory,
    /// Page size, capped by the store at [`ListQuery::MAX_PAGE_SIZE`].
    pub max_results: u32,
    /// Cursor returned by the previous page.
    pub next_cursor: Option<String>,
}

impl ListQuery {
    /// Largest page the store will return.
    pub const MAX_PAGE_SIZE: u32 = 500;

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            category: ResourceCategory::default(),
            max_results: Self::MAX_PAGE_SIZE,
            next_cursor: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: ResourceCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, Self::MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.next_cursor = cursor;
        self
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPage {
    #[serde(rename = "resources", default)]
    pub assets: Vec<RemoteAsset>,

    /// Present when more pages follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Options for building a delivery URL.
///
/// Transformation fields are rendered by the store in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryOptions {
    /// Override the store's configured scheme.
    pub secure: Option<bool>,
    /// Delivery format (file extension) appended to the public ID.
    pub format: Option<String>,
    /// Pin a specific asset version.
    pub version: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<String>,
    pub quality: Option<String>,
    pub fetch_format: Option<String>,
    pub gravity: Option<String>,
}

impl DeliveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    #[must_use]
    pub fn with_fetch_format(mut self, fetch_format: impl Into<String>) -> Self {
        self.fetch_format = Some(fetch_format.into());
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: impl Into<String>) -> Self {
        self.gravity = Some(gravity.into());
        self
    }

    /// Whether any transformation parameter is set.
    pub fn has_transformation(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.crop.is_some()
            || self.quality.is_some()
            || self.fetch_format.is_some()
            || self.gravity.is_some()
    }
}
