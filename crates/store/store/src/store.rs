use async_trait::async_trait;
use bytes::Bytes;
use cirrus_core::{AssetLocator, RemoteAsset, ResourceCategory};

use crate::error::StoreError;
use crate::types::{
    AssetPage, ByteStream, DeliveryOptions, DestroyOutcome, ListQuery, UploadOptions, UploadSource,
};

/// The remote asset store the adapter delegates to.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Every call is an independent request; the store, not the caller, owns
/// consistency for a given public ID.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload content under the given locator and return the stored asset.
    async fn upload(
        &self,
        source: UploadSource,
        target: &AssetLocator,
        options: &UploadOptions,
    ) -> Result<RemoteAsset, StoreError>;

    /// Rename an asset within a category.
    async fn rename(
        &self,
        from: &str,
        to: &str,
        category: &ResourceCategory,
    ) -> Result<RemoteAsset, StoreError>;

    /// Delete an asset. A missing asset is reported through the outcome,
    /// not as an error.
    async fn destroy(
        &self,
        locator: &AssetLocator,
        invalidate: bool,
    ) -> Result<DestroyOutcome, StoreError>;

    /// Fetch metadata for a single asset. Returns [`StoreError::NotFound`]
    /// when it does not exist.
    async fn fetch_asset(&self, locator: &AssetLocator) -> Result<RemoteAsset, StoreError>;

    /// Fetch one page of assets matching the query.
    async fn list_assets(&self, query: &ListQuery) -> Result<AssetPage, StoreError>;

    async fn create_folder(&self, name: &str) -> Result<(), StoreError>;

    async fn delete_folder(&self, name: &str) -> Result<(), StoreError>;

    /// Build the public delivery URL for an asset. Pure; no network.
    fn delivery_url(&self, locator: &AssetLocator, options: &DeliveryOptions) -> String;

    /// Fetch the bytes behind a delivery URL.
    async fn download(&self, url: &str) -> Result<Bytes, StoreError>;

    /// Fetch the bytes behind a delivery URL as a stream.
    async fn download_stream(&self, url: &str) -> Result<ByteStream, StoreError>;

    /// Verify credentials and connectivity.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
