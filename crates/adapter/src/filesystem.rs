use std::future::Future;

use bytes::Bytes;
use cirrus_core::{NormalizedMetadata, RemoteAsset};
use cirrus_store::{ByteStream, DeliveryOptions};
use serde::{Deserialize, Serialize};

use crate::adapter::CloudAdapter;
use crate::error::FilesystemError;

/// File visibility as understood by filesystem callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// The filesystem operation contract.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. Every operation reports failures as a [`FilesystemError`];
/// only the existence checks turn a missing target into `Ok(false)`.
pub trait Filesystem: Send + Sync {
    /// Create or replace the file at `path`.
    fn write(
        &self,
        path: &str,
        contents: Bytes,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send;

    /// Create or replace the file at `path` from a stream, without
    /// buffering it.
    fn write_stream(
        &self,
        path: &str,
        contents: ByteStream,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send;

    fn update(
        &self,
        path: &str,
        contents: Bytes,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send {
        self.write(path, contents)
    }

    fn update_stream(
        &self,
        path: &str,
        contents: ByteStream,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send {
        self.write_stream(path, contents)
    }

    fn read(&self, path: &str) -> impl Future<Output = Result<Bytes, FilesystemError>> + Send;

    fn read_stream(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<ByteStream, FilesystemError>> + Send;

    /// Delete the file. `Ok(false)` when the store reports nothing was
    /// deleted.
    fn delete(&self, path: &str) -> impl Future<Output = Result<bool, FilesystemError>> + Send;

    /// Move a file. `Ok(false)` when the store answered with a different
    /// identifier than the destination's.
    fn rename(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send;

    /// Copy a file. `Ok(false)` when the store answered with a different
    /// identifier than the destination's.
    fn copy(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send;

    fn file_exists(&self, path: &str) -> impl Future<Output = Result<bool, FilesystemError>> + Send;

    fn directory_exists(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send;

    /// List every file under `prefix`. Listing by prefix is always
    /// recursive, so `recursive` is accepted for compatibility only.
    fn list_contents(
        &self,
        prefix: &str,
        recursive: bool,
    ) -> impl Future<Output = Result<Vec<NormalizedMetadata>, FilesystemError>> + Send;

    fn metadata(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<NormalizedMetadata, FilesystemError>> + Send;

    fn file_size(&self, path: &str) -> impl Future<Output = Result<u64, FilesystemError>> + Send;

    fn mime_type(&self, path: &str)
    -> impl Future<Output = Result<String, FilesystemError>> + Send;

    /// Creation time in Unix epoch seconds.
    fn last_modified(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<i64, FilesystemError>> + Send;

    fn create_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(), FilesystemError>> + Send;

    fn delete_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(), FilesystemError>> + Send;

    /// Public URL for the file. Pure; no store call.
    fn url(&self, path: &str, options: &DeliveryOptions) -> Result<String, FilesystemError>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FilesystemError>;

    fn visibility(&self, path: &str) -> Result<Visibility, FilesystemError>;
}

impl Filesystem for CloudAdapter {
    fn write(
        &self,
        path: &str,
        contents: Bytes,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send {
        CloudAdapter::write(self, path, contents)
    }

    fn write_stream(
        &self,
        path: &str,
        contents: ByteStream,
    ) -> impl Future<Output = Result<RemoteAsset, FilesystemError>> + Send {
        CloudAdapter::write_stream(self, path, contents)
    }

    fn read(&self, path: &str) -> impl Future<Output = Result<Bytes, FilesystemError>> + Send {
        CloudAdapter::read(self, path)
    }

    fn read_stream(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<ByteStream, FilesystemError>> + Send {
        CloudAdapter::read_stream(self, path)
    }

    fn delete(&self, path: &str) -> impl Future<Output = Result<bool, FilesystemError>> + Send {
        CloudAdapter::delete(self, path)
    }

    fn rename(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send {
        CloudAdapter::rename(self, from, to)
    }

    fn copy(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send {
        CloudAdapter::copy(self, from, to)
    }

    fn file_exists(&self, path: &str) -> impl Future<Output = Result<bool, FilesystemError>> + Send {
        CloudAdapter::file_exists(self, path)
    }

    fn directory_exists(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<bool, FilesystemError>> + Send {
        CloudAdapter::directory_exists(self, path)
    }

    fn list_contents(
        &self,
        prefix: &str,
        recursive: bool,
    ) -> impl Future<Output = Result<Vec<NormalizedMetadata>, FilesystemError>> + Send {
        CloudAdapter::list_contents(self, prefix, recursive)
    }

    fn metadata(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<NormalizedMetadata, FilesystemError>> + Send {
        CloudAdapter::metadata(self, path)
    }

    fn file_size(&self, path: &str) -> impl Future<Output = Result<u64, FilesystemError>> + Send {
        CloudAdapter::file_size(self, path)
    }

    fn mime_type(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<String, FilesystemError>> + Send {
        CloudAdapter::mime_type(self, path)
    }

    fn last_modified(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<i64, FilesystemError>> + Send {
        CloudAdapter::last_modified(self, path)
    }

    fn create_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(), FilesystemError>> + Send {
        CloudAdapter::create_directory(self, path)
    }

    fn delete_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(), FilesystemError>> + Send {
        CloudAdapter::delete_directory(self, path)
    }

    fn url(&self, path: &str, options: &DeliveryOptions) -> Result<String, FilesystemError> {
        CloudAdapter::url(self, path, options)
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FilesystemError> {
        CloudAdapter::set_visibility(self, path, visibility)
    }

    fn visibility(&self, path: &str) -> Result<Visibility, FilesystemError> {
        CloudAdapter::visibility(self, path)
    }
}
