use bytes::Bytes;
use cirrus_core::NormalizedMetadata;
use cirrus_store::{ByteStream, DeliveryOptions};
use tracing::warn;

use crate::adapter::CloudAdapter;
use crate::error::FilesystemError;
use crate::filesystem::Filesystem;

/// Boolean-returning view over a [`Filesystem`].
///
/// Callers that only care whether an operation worked get `true`/`false` or
/// `Some`/`None` instead of a [`FilesystemError`]. Every collapsed error is
/// logged at `warn` level with its operation and location first, so failures
/// stay visible.
#[derive(Debug, Clone)]
pub struct LenientAdapter<F: Filesystem = CloudAdapter> {
    inner: F,
}

fn collapse<T>(result: Result<T, FilesystemError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                operation = %e.operation(),
                location = e.location(),
                error = %e,
                "filesystem operation failed"
            );
            None
        }
    }
}

impl<F: Filesystem> LenientAdapter<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    pub async fn write(&self, path: &str, contents: Bytes) -> bool {
        collapse(self.inner.write(path, contents).await).is_some()
    }

    pub async fn write_stream(&self, path: &str, contents: ByteStream) -> bool {
        collapse(self.inner.write_stream(path, contents).await).is_some()
    }

    pub async fn update(&self, path: &str, contents: Bytes) -> bool {
        collapse(self.inner.update(path, contents).await).is_some()
    }

    pub async fn update_stream(&self, path: &str, contents: ByteStream) -> bool {
        collapse(self.inner.update_stream(path, contents).await).is_some()
    }

    pub async fn read(&self, path: &str) -> Option<Bytes> {
        collapse(self.inner.read(path).await)
    }

    pub async fn read_stream(&self, path: &str) -> Option<ByteStream> {
        collapse(self.inner.read_stream(path).await)
    }

    pub async fn delete(&self, path: &str) -> bool {
        collapse(self.inner.delete(path).await).unwrap_or(false)
    }

    pub async fn rename(&self, from: &str, to: &str) -> bool {
        collapse(self.inner.rename(from, to).await).unwrap_or(false)
    }

    pub async fn copy(&self, from: &str, to: &str) -> bool {
        collapse(self.inner.copy(from, to).await).unwrap_or(false)
    }

    /// `false` both when the file is missing and when the check failed.
    pub async fn has(&self, path: &str) -> bool {
        collapse(self.inner.file_exists(path).await).unwrap_or(false)
    }

    pub async fn has_directory(&self, path: &str) -> bool {
        collapse(self.inner.directory_exists(path).await).unwrap_or(false)
    }

    /// Listing failures yield an empty list.
    pub async fn list_contents(&self, prefix: &str, recursive: bool) -> Vec<NormalizedMetadata> {
        collapse(self.inner.list_contents(prefix, recursive).await).unwrap_or_default()
    }

    pub async fn metadata(&self, path: &str) -> Option<NormalizedMetadata> {
        collapse(self.inner.metadata(path).await)
    }

    pub async fn size(&self, path: &str) -> Option<u64> {
        collapse(self.inner.file_size(path).await)
    }

    pub async fn mimetype(&self, path: &str) -> Option<String> {
        collapse(self.inner.mime_type(path).await)
    }

    pub async fn timestamp(&self, path: &str) -> Option<i64> {
        collapse(self.inner.last_modified(path).await)
    }

    pub async fn create_dir(&self, path: &str) -> bool {
        collapse(self.inner.create_directory(path).await).is_some()
    }

    pub async fn delete_dir(&self, path: &str) -> bool {
        collapse(self.inner.delete_directory(path).await).is_some()
    }

    pub fn url(&self, path: &str, options: &DeliveryOptions) -> Option<String> {
        collapse(self.inner.url(path, options))
    }
}

impl<F: Filesystem> From<F> for LenientAdapter<F> {
    fn from(inner: F) -> Self {
        Self::new(inner)
    }
}
