use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{SecondsFormat, Utc};
use dashmap::{DashMap, DashSet};
use futures::TryStreamExt;
use tracing::debug;

use cirrus_core::{AssetLocator, PathInfo, RemoteAsset, ResourceCategory};
use cirrus_store::error::StoreError;
use cirrus_store::store::AssetStore;
use cirrus_store::types::{
    AssetPage, ByteStream, DeliveryOptions, DestroyOutcome, ListQuery, UploadOptions, UploadSource,
};

const URL_SCHEME: &str = "memory://";

/// A single stored asset.
#[derive(Debug, Clone)]
struct StoredAsset {
    content: Bytes,
    created_at: String,
    format: Option<String>,
    version: u64,
}

/// In-memory [`AssetStore`] backed by a [`DashMap`].
///
/// Assets are keyed by `(identifier, category)`. Listing is ordered by
/// identifier and the cursor is the offset of the next page. Delivery URLs
/// use the `memory://{category}/{identifier}[.{format}]` form and are only
/// resolvable by the store that produced them.
///
/// Every trait call is counted so tests can assert how often the store was
/// hit.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: DashMap<AssetLocator, StoredAsset>,
    folders: DashSet<String>,
    calls: DashMap<&'static str, usize>,
}

impl MemoryAssetStore {
    /// Create a new, empty in-memory asset store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the named trait method was called.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls.get(method).map_or(0, |count| *count)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Whether a folder was created and not yet deleted.
    pub fn has_folder(&self, name: &str) -> bool {
        self.folders.contains(name)
    }

    fn record(&self, method: &'static str) {
        *self.calls.entry(method).or_insert(0) += 1;
    }

    fn describe(locator: &AssetLocator, asset: &StoredAsset) -> RemoteAsset {
        let mut options = DeliveryOptions::new();
        if let Some(format) = &asset.format {
            options = options.with_format(format.clone());
        }
        RemoteAsset {
            public_id: locator.identifier.clone(),
            resource_type: locator.category.clone(),
            bytes: u64::try_from(asset.content.len()).unwrap_or(u64::MAX),
            created_at: asset.created_at.clone(),
            format: asset.format.clone(),
            version: Some(asset.version),
            secure_url: Some(render_url(locator, &options)),
        }
    }

    /// Resolve a `memory://` URL to the stored asset it points at.
    fn resolve(&self, url: &str) -> Result<(AssetLocator, StoredAsset), StoreError> {
        let rest = url.strip_prefix(URL_SCHEME).ok_or_else(|| StoreError::Api {
            status: 400,
            message: format!("unsupported delivery URL: {url}"),
        })?;
        let (category, path) = rest.split_once('/').ok_or_else(|| StoreError::Api {
            status: 400,
            message: format!("malformed delivery URL: {url}"),
        })?;
        let category = ResourceCategory::from(category);

        // The identifier may itself contain a dot, so try it verbatim first.
        let exact = AssetLocator::new(path, category.clone());
        if let Some(asset) = self.assets.get(&exact) {
            return Ok((exact, asset.value().clone()));
        }
        if let Some(extension) = PathInfo::parse(path).extension {
            let stripped = &path[..path.len() - extension.len() - 1];
            let locator = AssetLocator::new(stripped, category);
            if let Some(asset) = self.assets.get(&locator) {
                return Ok((locator, asset.value().clone()));
            }
        }
        Err(StoreError::NotFound(url.to_owned()))
    }

    fn next_version(&self, locator: &AssetLocator) -> u64 {
        self.assets.get(locator).map_or(1, |existing| existing.version + 1)
    }
}

fn render_url(locator: &AssetLocator, options: &DeliveryOptions) -> String {
    match &options.format {
        Some(format) => format!(
            "{URL_SCHEME}{}/{}.{format}",
            locator.category, locator.identifier
        ),
        None => format!("{URL_SCHEME}{}/{}", locator.category, locator.identifier),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload(
        &self,
        source: UploadSource,
        target: &AssetLocator,
        options: &UploadOptions,
    ) -> Result<RemoteAsset, StoreError> {
        self.record("upload");
        debug!(identifier = %target.identifier, source = source.kind(), "memory upload");

        let (content, source_format) = match source {
            UploadSource::Bytes(bytes) => (bytes, None),
            UploadSource::Stream(stream) => {
                let buffer: BytesMut = stream
                    .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                        buffer.extend_from_slice(&chunk);
                        Ok(buffer)
                    })
                    .await?;
                (buffer.freeze(), None)
            }
            UploadSource::Url(url) => {
                let (_, asset) = self.resolve(&url)?;
                (asset.content, asset.format)
            }
        };

        let format = if target.category.is_raw() {
            None
        } else {
            options.format().map(str::to_owned).or(source_format)
        };
        let stored = StoredAsset {
            content,
            created_at: now(),
            format,
            version: self.next_version(target),
        };
        let asset = Self::describe(target, &stored);
        self.assets.insert(target.clone(), stored);
        Ok(asset)
    }

    async fn rename(
        &self,
        from: &str,
        to: &str,
        category: &ResourceCategory,
    ) -> Result<RemoteAsset, StoreError> {
        self.record("rename");
        let source = AssetLocator::new(from, category.clone());
        let (_, mut stored) = self
            .assets
            .remove(&source)
            .ok_or_else(|| StoreError::NotFound(from.to_owned()))?;

        let target = AssetLocator::new(to, category.clone());
        stored.version = self.next_version(&target);
        let asset = Self::describe(&target, &stored);
        self.assets.insert(target, stored);
        Ok(asset)
    }

    async fn destroy(
        &self,
        locator: &AssetLocator,
        _invalidate: bool,
    ) -> Result<DestroyOutcome, StoreError> {
        self.record("destroy");
        debug!(identifier = %locator.identifier, "memory destroy");
        Ok(match self.assets.remove(locator) {
            Some(_) => DestroyOutcome::ok(),
            None => DestroyOutcome::not_found(),
        })
    }

    async fn fetch_asset(&self, locator: &AssetLocator) -> Result<RemoteAsset, StoreError> {
        self.record("fetch_asset");
        self.assets
            .get(locator)
            .map(|stored| Self::describe(locator, &stored))
            .ok_or_else(|| StoreError::NotFound(locator.identifier.clone()))
    }

    async fn list_assets(&self, query: &ListQuery) -> Result<AssetPage, StoreError> {
        self.record("list_assets");

        let offset = match &query.next_cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| StoreError::Api {
                status: 400,
                message: format!("invalid cursor: {cursor}"),
            })?,
            None => 0,
        };
        let page_size = usize::try_from(query.max_results).unwrap_or(usize::MAX);

        let mut matching: Vec<RemoteAsset> = self
            .assets
            .iter()
            .filter(|entry| {
                entry.key().category == query.category
                    && entry.key().identifier.starts_with(&query.prefix)
            })
            .map(|entry| Self::describe(entry.key(), entry.value()))
            .collect();
        matching.sort_by(|a, b| a.public_id.cmp(&b.public_id));

        let total = matching.len();
        let assets: Vec<RemoteAsset> = matching.into_iter().skip(offset).take(page_size).collect();
        let end = offset.saturating_add(page_size);
        let next_cursor = (end < total).then(|| end.to_string());

        Ok(AssetPage {
            assets,
            next_cursor,
        })
    }

    async fn create_folder(&self, name: &str) -> Result<(), StoreError> {
        self.record("create_folder");
        self.folders.insert(name.to_owned());
        Ok(())
    }

    async fn delete_folder(&self, name: &str) -> Result<(), StoreError> {
        self.record("delete_folder");
        let prefix = format!("{name}/");
        if self
            .assets
            .iter()
            .any(|entry| entry.key().identifier.starts_with(&prefix))
        {
            return Err(StoreError::Api {
                status: 400,
                message: format!("Folder is not empty: {name}"),
            });
        }
        self.folders
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    fn delivery_url(&self, locator: &AssetLocator, options: &DeliveryOptions) -> String {
        render_url(locator, options)
    }

    async fn download(&self, url: &str) -> Result<Bytes, StoreError> {
        self.record("download");
        self.resolve(url).map(|(_, asset)| asset.content)
    }

    async fn download_stream(&self, url: &str) -> Result<ByteStream, StoreError> {
        self.record("download_stream");
        let (_, asset) = self.resolve(url)?;
        Ok(Box::pin(futures::stream::iter([Ok(asset.content)])))
    }
}
