use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use cirrus_core::{
    AssetLocator, CoreError, NormalizedMetadata, PathInfo, PathMapper, RemoteAsset, normalize,
};
use cirrus_store::{
    AssetStore, ByteStream, DeliveryOptions, ListQuery, StoreError, UploadOptions, UploadSource,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::AdapterConfig;
use crate::error::{FilesystemError, MetadataKind, Operation};
use crate::filesystem::Visibility;

/// Filesystem adapter over a remote asset store.
///
/// Each path is normalized, classified into a category by its extension and
/// turned into a public ID before the store is called. The adapter holds no
/// mutable state; clones share the store, the classification table and the
/// cancellation token.
///
/// Every store call races the adapter's [`CancellationToken`]. Once the token
/// is cancelled, in-flight and future operations fail with
/// [`StoreError::Cancelled`] wrapped in the operation's error.
#[derive(Clone)]
pub struct CloudAdapter {
    store: Arc<dyn AssetStore>,
    mapper: PathMapper,
    config: Arc<AdapterConfig>,
    cancel: CancellationToken,
}

impl fmt::Debug for CloudAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudAdapter")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Wait until `token` is cancelled, or forever when there is none.
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

impl CloudAdapter {
    pub fn new(store: Arc<dyn AssetStore>, config: AdapterConfig) -> Self {
        let mapper = PathMapper::new(config.extensions.clone());
        Self {
            store,
            mapper,
            config: Arc::new(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` instead of the adapter's own cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Normalize a file path and derive its locator. The storage root is not
    /// a file, so an empty result is rejected.
    fn locate(
        &self,
        operation: Operation,
        path: &str,
    ) -> Result<(String, AssetLocator), FilesystemError> {
        let normalized = Self::normalize_dir(operation, path)?;
        if normalized.is_empty() {
            return Err(FilesystemError::invalid_path(
                operation,
                path,
                CoreError::InvalidPath {
                    path: path.to_owned(),
                    reason: "path does not name a file".to_owned(),
                },
            ));
        }
        let locator = self.mapper.locate(&normalized);
        Ok((normalized, locator))
    }

    /// Normalize a directory path. The empty string is the root.
    fn normalize_dir(operation: Operation, path: &str) -> Result<String, FilesystemError> {
        normalize(path).map_err(|e| FilesystemError::invalid_path(operation, path, e))
    }

    /// Listing prefix for a normalized directory. The trailing separator
    /// keeps sibling names such as `docs-archive/` out of `docs/`.
    fn dir_prefix(normalized: &str) -> String {
        if normalized.is_empty() {
            String::new()
        } else {
            format!("{normalized}/")
        }
    }

    /// Delivery options for reading a file back. Non-raw identifiers have
    /// their extension stripped, so it is sent as the delivery format.
    fn delivery_options(normalized: &str, locator: &AssetLocator) -> DeliveryOptions {
        let mut options = DeliveryOptions::new();
        if !locator.category.is_raw() {
            if let Some(extension) = PathInfo::parse(normalized)
                .extension
                .filter(|extension| !extension.is_empty())
            {
                options = options.with_format(extension);
            }
        }
        options
    }

    fn delivery_url(&self, normalized: &str, locator: &AssetLocator) -> String {
        self.store
            .delivery_url(locator, &Self::delivery_options(normalized, locator))
    }

    fn is_cancelled(&self, extra: Option<&CancellationToken>) -> bool {
        self.cancel.is_cancelled() || extra.is_some_and(CancellationToken::is_cancelled)
    }

    /// Run a store call unless the adapter token (or `extra`) is cancelled
    /// first.
    async fn guard<T>(
        &self,
        extra: Option<&CancellationToken>,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StoreError::Cancelled),
            () = cancelled(extra) => Err(StoreError::Cancelled),
            result = call => result,
        }
    }

    async fn upload(&self, path: &str, source: UploadSource) -> Result<RemoteAsset, FilesystemError> {
        let (normalized, locator) = self.locate(Operation::Write, path)?;
        let options = UploadOptions::for_write(PathInfo::parse(&normalized).basename);

        let asset = self
            .guard(None, self.store.upload(source, &locator, &options))
            .await
            .map_err(|e| FilesystemError::write(path, e))?;

        info!(public_id = %asset.public_id, category = %asset.resource_type, "file written");
        Ok(asset)
    }

    #[instrument(skip(self, contents), fields(size = contents.len()))]
    pub async fn write(&self, path: &str, contents: Bytes) -> Result<RemoteAsset, FilesystemError> {
        self.upload(path, UploadSource::Bytes(contents)).await
    }

    #[instrument(skip(self, contents))]
    pub async fn write_stream(
        &self,
        path: &str,
        contents: ByteStream,
    ) -> Result<RemoteAsset, FilesystemError> {
        self.upload(path, UploadSource::Stream(contents)).await
    }

    pub async fn update(&self, path: &str, contents: Bytes) -> Result<RemoteAsset, FilesystemError> {
        self.write(path, contents).await
    }

    pub async fn update_stream(
        &self,
        path: &str,
        contents: ByteStream,
    ) -> Result<RemoteAsset, FilesystemError> {
        self.write_stream(path, contents).await
    }

    #[instrument(skip(self))]
    pub async fn read(&self, path: &str) -> Result<Bytes, FilesystemError> {
        let (normalized, locator) = self.locate(Operation::Read, path)?;
        let url = self.delivery_url(&normalized, &locator);
        debug!(%url, "downloading file");
        self.guard(None, self.store.download(&url))
            .await
            .map_err(|e| FilesystemError::read(path, e))
    }

    #[instrument(skip(self))]
    pub async fn read_stream(&self, path: &str) -> Result<ByteStream, FilesystemError> {
        let (normalized, locator) = self.locate(Operation::Read, path)?;
        let url = self.delivery_url(&normalized, &locator);
        debug!(%url, "streaming file");
        self.guard(None, self.store.download_stream(&url))
            .await
            .map_err(|e| FilesystemError::read(path, e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<bool, FilesystemError> {
        let (_, locator) = self.locate(Operation::Delete, path)?;
        let outcome = self
            .guard(None, self.store.destroy(&locator, true))
            .await
            .map_err(|e| FilesystemError::delete(path, e))?;

        if outcome.is_ok() {
            info!(public_id = %locator.identifier, "file deleted");
        } else {
            debug!(public_id = %locator.identifier, result = %outcome.result, "nothing deleted");
        }
        Ok(outcome.is_ok())
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, from: &str, to: &str) -> Result<bool, FilesystemError> {
        let (_, source) = self.locate(Operation::Move, from)?;
        let (_, target) = self.locate(Operation::Move, to)?;

        let asset = self
            .guard(
                None,
                self.store
                    .rename(&source.identifier, &target.identifier, &target.category),
            )
            .await
            .map_err(|e| FilesystemError::move_failed(from, to, e))?;

        let moved = asset.public_id == target.identifier;
        if moved {
            info!(from = %source.identifier, to = %target.identifier, "file moved");
        }
        Ok(moved)
    }

    #[instrument(skip(self))]
    pub async fn copy(&self, from: &str, to: &str) -> Result<bool, FilesystemError> {
        let (normalized, source) = self.locate(Operation::Copy, from)?;
        let (_, target) = self.locate(Operation::Copy, to)?;
        let url = self.delivery_url(&normalized, &source);

        let asset = self
            .guard(
                None,
                self.store
                    .upload(UploadSource::Url(url), &target, &UploadOptions::default()),
            )
            .await
            .map_err(|e| FilesystemError::copy_failed(from, to, e))?;

        let copied = asset.public_id == target.identifier;
        if copied {
            info!(from = %source.identifier, to = %target.identifier, "file copied");
        }
        Ok(copied)
    }

    #[instrument(skip(self))]
    pub async fn file_exists(&self, path: &str) -> Result<bool, FilesystemError> {
        let (_, locator) = self.locate(Operation::ExistenceCheck, path)?;
        match self.guard(None, self.store.fetch_asset(&locator)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(FilesystemError::check(path, e)),
        }
    }

    /// A directory exists when at least one asset lives under it. The root
    /// always exists.
    #[instrument(skip(self))]
    pub async fn directory_exists(&self, path: &str) -> Result<bool, FilesystemError> {
        let normalized = Self::normalize_dir(Operation::ExistenceCheck, path)?;
        if normalized.is_empty() {
            return Ok(true);
        }
        let prefix = Self::dir_prefix(&normalized);

        for category in &self.config.list_categories {
            let query = ListQuery::new(prefix.clone())
                .with_category(category.clone())
                .with_max_results(1);
            match self.guard(None, self.store.list_assets(&query)).await {
                Ok(page) if !page.assets.is_empty() => return Ok(true),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(FilesystemError::check(path, e)),
            }
        }
        Ok(false)
    }

    pub async fn list_contents(
        &self,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<NormalizedMetadata>, FilesystemError> {
        self.list(prefix, recursive, None).await
    }

    /// Like [`list_contents`](Self::list_contents), but also stops when
    /// `token` is cancelled.
    pub async fn list_contents_with_cancel(
        &self,
        prefix: &str,
        recursive: bool,
        token: &CancellationToken,
    ) -> Result<Vec<NormalizedMetadata>, FilesystemError> {
        self.list(prefix, recursive, Some(token)).await
    }

    #[instrument(skip(self, extra))]
    async fn list(
        &self,
        prefix: &str,
        recursive: bool,
        extra: Option<&CancellationToken>,
    ) -> Result<Vec<NormalizedMetadata>, FilesystemError> {
        let normalized = Self::normalize_dir(Operation::ListContents, prefix)?;
        let prefix_query = Self::dir_prefix(&normalized);
        let page_size = self.config.effective_page_size();
        let mut contents = Vec::new();

        for category in &self.config.list_categories {
            let mut cursor: Option<String> = None;
            loop {
                if self.is_cancelled(extra) {
                    return Err(FilesystemError::list(prefix, StoreError::Cancelled));
                }

                let query = ListQuery::new(prefix_query.clone())
                    .with_category(category.clone())
                    .with_max_results(page_size)
                    .with_cursor(cursor.clone());
                let page = self
                    .guard(extra, self.store.list_assets(&query))
                    .await
                    .map_err(|e| FilesystemError::list(prefix, e))?;
                debug!(
                    category = %category,
                    count = page.assets.len(),
                    more = page.next_cursor.is_some(),
                    "listing page received"
                );

                for asset in &page.assets {
                    let entry = NormalizedMetadata::try_from(asset)
                        .map_err(|e| FilesystemError::list(prefix, e))?;
                    contents.push(entry);
                }

                match page.next_cursor {
                    None => break,
                    Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                        return Err(FilesystemError::list_reason(
                            prefix,
                            format!("store returned cursor {next} twice"),
                        ));
                    }
                    Some(next) => cursor = Some(next),
                }
            }
        }

        Ok(contents)
    }

    async fn fetch(&self, kind: MetadataKind, path: &str) -> Result<RemoteAsset, FilesystemError> {
        let (_, locator) = self.locate(Operation::RetrieveMetadata, path)?;
        self.guard(None, self.store.fetch_asset(&locator))
            .await
            .map_err(|e| FilesystemError::metadata(kind, path, e))
    }

    #[instrument(skip(self))]
    pub async fn metadata(&self, path: &str) -> Result<NormalizedMetadata, FilesystemError> {
        let asset = self.fetch(MetadataKind::Metadata, path).await?;
        NormalizedMetadata::try_from(&asset)
            .map_err(|e| FilesystemError::metadata(MetadataKind::Metadata, path, e))
    }

    #[instrument(skip(self))]
    pub async fn file_size(&self, path: &str) -> Result<u64, FilesystemError> {
        Ok(self.fetch(MetadataKind::FileSize, path).await?.bytes)
    }

    #[instrument(skip(self))]
    pub async fn mime_type(&self, path: &str) -> Result<String, FilesystemError> {
        Ok(self.fetch(MetadataKind::MimeType, path).await?.mimetype())
    }

    #[instrument(skip(self))]
    pub async fn last_modified(&self, path: &str) -> Result<i64, FilesystemError> {
        self.fetch(MetadataKind::LastModified, path)
            .await?
            .timestamp()
            .map_err(|e| FilesystemError::metadata(MetadataKind::LastModified, path, e))
    }

    fn folder(operation: Operation, path: &str) -> Result<String, FilesystemError> {
        let normalized = Self::normalize_dir(operation, path)?;
        if normalized.is_empty() {
            return Err(FilesystemError::invalid_path(
                operation,
                path,
                CoreError::InvalidPath {
                    path: path.to_owned(),
                    reason: "the root directory cannot be changed".to_owned(),
                },
            ));
        }
        Ok(normalized)
    }

    #[instrument(skip(self))]
    pub async fn create_directory(&self, path: &str) -> Result<(), FilesystemError> {
        let folder = Self::folder(Operation::CreateDirectory, path)?;
        self.guard(None, self.store.create_folder(&folder))
            .await
            .map_err(|e| FilesystemError::directory(Operation::CreateDirectory, path, e))?;
        info!(%folder, "directory created");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_directory(&self, path: &str) -> Result<(), FilesystemError> {
        let folder = Self::folder(Operation::DeleteDirectory, path)?;
        self.guard(None, self.store.delete_folder(&folder))
            .await
            .map_err(|e| FilesystemError::directory(Operation::DeleteDirectory, path, e))?;
        info!(%folder, "directory deleted");
        Ok(())
    }

    /// Public delivery URL for the file. Explicit `options` win over the
    /// format derived from the path.
    pub fn url(&self, path: &str, options: &DeliveryOptions) -> Result<String, FilesystemError> {
        let (normalized, locator) = self.locate(Operation::Read, path)?;
        let mut options = options.clone();
        if options.format.is_none() {
            options.format = Self::delivery_options(&normalized, &locator).format;
        }
        Ok(self.store.delivery_url(&locator, &options))
    }

    /// Visibility is not supported by the store.
    pub fn set_visibility(&self, path: &str, _visibility: Visibility) -> Result<(), FilesystemError> {
        Err(FilesystemError::unsupported(Operation::SetVisibility, path))
    }

    /// Visibility is not supported by the store.
    pub fn visibility(&self, path: &str) -> Result<Visibility, FilesystemError> {
        Err(FilesystemError::unsupported(Operation::Visibility, path))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use cirrus_core::{ClassificationTable, ResourceCategory};
    use cirrus_store::{AssetPage, DestroyOutcome};
    use cirrus_store_memory::MemoryAssetStore;

    use super::*;

    enum FetchScript {
        Missing,
        Fails,
        Asset(RemoteAsset),
    }

    /// A store that answers listing and lookup calls from a script.
    struct ScriptedStore {
        pages: Mutex<VecDeque<AssetPage>>,
        cursors: Mutex<Vec<Option<String>>>,
        list_calls: AtomicUsize,
        fetch: FetchScript,
        cancel_after_list: Option<CancellationToken>,
        /// Public ID reported back by `upload` and `rename`.
        stored_as: Option<String>,
    }

    impl ScriptedStore {
        fn new(fetch: FetchScript) -> Self {
            Self {
                pages: Mutex::new(VecDeque::new()),
                cursors: Mutex::new(Vec::new()),
                list_calls: AtomicUsize::new(0),
                fetch,
                cancel_after_list: None,
                stored_as: None,
            }
        }

        fn storing_as(mut self, public_id: &str) -> Self {
            self.stored_as = Some(public_id.to_owned());
            self
        }

        fn stored(&self) -> Result<RemoteAsset, StoreError> {
            match &self.stored_as {
                Some(id) => Ok(asset(id)),
                None => unscripted(),
            }
        }

        fn with_pages(self, pages: impl IntoIterator<Item = AssetPage>) -> Self {
            self.pages.lock().unwrap().extend(pages);
            self
        }
    }

    fn unscripted<T>() -> Result<T, StoreError> {
        Err(StoreError::Api {
            status: 500,
            message: "unscripted call".into(),
        })
    }

    #[async_trait]
    impl AssetStore for ScriptedStore {
        async fn upload(
            &self,
            _source: UploadSource,
            _target: &AssetLocator,
            _options: &UploadOptions,
        ) -> Result<RemoteAsset, StoreError> {
            self.stored()
        }

        async fn rename(
            &self,
            _from: &str,
            _to: &str,
            _category: &ResourceCategory,
        ) -> Result<RemoteAsset, StoreError> {
            self.stored()
        }

        async fn destroy(
            &self,
            _locator: &AssetLocator,
            _invalidate: bool,
        ) -> Result<DestroyOutcome, StoreError> {
            Ok(DestroyOutcome::not_found())
        }

        async fn fetch_asset(&self, locator: &AssetLocator) -> Result<RemoteAsset, StoreError> {
            match &self.fetch {
                FetchScript::Missing => Err(StoreError::NotFound(locator.identifier.clone())),
                FetchScript::Fails => Err(StoreError::Connection("connection reset".into())),
                FetchScript::Asset(asset) => Ok(asset.clone()),
            }
        }

        async fn list_assets(&self, query: &ListQuery) -> Result<AssetPage, StoreError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.cursors.lock().unwrap().push(query.next_cursor.clone());
            if let Some(token) = &self.cancel_after_list {
                token.cancel();
            }
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn create_folder(&self, _name: &str) -> Result<(), StoreError> {
            unscripted()
        }

        async fn delete_folder(&self, _name: &str) -> Result<(), StoreError> {
            unscripted()
        }

        fn delivery_url(&self, locator: &AssetLocator, _options: &DeliveryOptions) -> String {
            format!("scripted://{}", locator.identifier)
        }

        // Delivery never answers in time.
        async fn download(&self, _url: &str) -> Result<Bytes, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn download_stream(&self, _url: &str) -> Result<ByteStream, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    fn asset(id: &str) -> RemoteAsset {
        RemoteAsset {
            public_id: id.to_owned(),
            resource_type: ResourceCategory::Image,
            bytes: 10,
            created_at: "2017-08-11T12:24:32Z".to_owned(),
            format: Some("jpg".to_owned()),
            version: None,
            secure_url: None,
        }
    }

    fn page(ids: &[&str], cursor: Option<&str>) -> AssetPage {
        AssetPage {
            assets: ids.iter().map(|id| asset(id)).collect(),
            next_cursor: cursor.map(str::to_owned),
        }
    }

    fn table() -> ClassificationTable {
        ClassificationTable::new()
            .with_category(ResourceCategory::Image, ["png", "jpg"])
            .with_category(ResourceCategory::Video, ["mp4"])
            .with_category(ResourceCategory::Raw, ["pdf", "txt"])
    }

    fn adapter_over(store: Arc<dyn AssetStore>) -> CloudAdapter {
        CloudAdapter::new(store, AdapterConfig::new().with_extensions(table()))
    }

    #[tokio::test]
    async fn pagination_follows_cursors_in_order() {
        let store = Arc::new(ScriptedStore::new(FetchScript::Missing).with_pages([
            page(&["a/1", "a/2"], Some("c1")),
            page(&["a/3", "a/4"], Some("c2")),
            page(&["a/5", "a/6"], None),
        ]));
        let adapter = adapter_over(store.clone());

        let contents = adapter.list_contents("a", false).await.unwrap();

        let paths: Vec<_> = contents.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, ["a/1", "a/2", "a/3", "a/4", "a/5", "a/6"]);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *store.cursors.lock().unwrap(),
            vec![None, Some("c1".to_owned()), Some("c2".to_owned())]
        );
        assert_eq!(contents[0].mimetype, "image/jpeg");
        assert_eq!(contents[0].timestamp, 1_502_454_272);
    }

    #[tokio::test]
    async fn repeated_cursor_is_a_list_failure() {
        let store = Arc::new(ScriptedStore::new(FetchScript::Missing).with_pages([
            page(&["a/1"], Some("stuck")),
            page(&["a/2"], Some("stuck")),
            page(&["a/3"], None),
        ]));
        let adapter = adapter_over(store.clone());

        let err = adapter.list_contents("a", true).await.unwrap_err();
        assert!(matches!(err, FilesystemError::ListFailed { .. }));
        assert!(err.reason().contains("stuck"));
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancellation_between_pages_fails_listing() {
        let token = CancellationToken::new();
        let mut store = ScriptedStore::new(FetchScript::Missing).with_pages([
            page(&["a/1"], Some("c1")),
            page(&["a/2"], None),
        ]);
        store.cancel_after_list = Some(token.clone());
        let store = Arc::new(store);
        let adapter = adapter_over(store.clone()).with_cancellation(token);

        let err = adapter.list_contents("a", false).await.unwrap_err();
        assert!(matches!(err, FilesystemError::ListFailed { .. }));
        assert!(err.is_cancelled());
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn per_call_token_cancels_listing() {
        let store = Arc::new(
            ScriptedStore::new(FetchScript::Missing).with_pages([page(&["a/1"], None)]),
        );
        let adapter = adapter_over(store.clone());
        let token = CancellationToken::new();
        token.cancel();

        let err = adapter
            .list_contents_with_cancel("a", false, &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
        assert!(!adapter.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn listing_scans_configured_categories() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = CloudAdapter::new(
            store.clone(),
            AdapterConfig::new()
                .with_extensions(table())
                .with_list_categories([ResourceCategory::Image, ResourceCategory::Raw]),
        );
        adapter.write("docs/a.png", Bytes::from_static(b"1")).await.unwrap();
        adapter.write("docs/b.pdf", Bytes::from_static(b"22")).await.unwrap();
        adapter.write("other/c.png", Bytes::from_static(b"3")).await.unwrap();

        let contents = adapter.list_contents("docs/", false).await.unwrap();
        let paths: Vec<_> = contents.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, ["docs/a", "docs/b.pdf"]);
        assert_eq!(contents[1].mimetype, "raw");
        assert_eq!(store.call_count("list_assets"), 2);
    }

    #[tokio::test]
    async fn file_exists_collapses_only_not_found() {
        let missing = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Missing)));
        assert!(!missing.file_exists("a/b.png").await.unwrap());

        let failing = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Fails)));
        let err = failing.file_exists("a/b.png").await.unwrap_err();
        assert!(matches!(err, FilesystemError::CheckFailed { .. }));
        assert_eq!(err.operation(), Operation::ExistenceCheck);
        assert_eq!(err.reason(), "connection error: connection reset");

        let present = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Asset(asset("a/b")))));
        assert!(present.file_exists("a/b.png").await.unwrap());
    }

    #[tokio::test]
    async fn metadata_projections() {
        let adapter = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Asset(asset(
            "albums/cat",
        )))));
        let metadata = adapter.metadata("albums/cat.jpg").await.unwrap();
        assert_eq!(metadata.path, "albums/cat");
        assert_eq!(adapter.file_size("albums/cat.jpg").await.unwrap(), 10);
        assert_eq!(adapter.mime_type("albums/cat.jpg").await.unwrap(), "image/jpeg");
        assert_eq!(
            adapter.last_modified("albums/cat.jpg").await.unwrap(),
            1_502_454_272
        );
    }

    #[tokio::test]
    async fn bad_timestamp_is_metadata_failure() {
        let mut broken = asset("albums/cat");
        broken.created_at = "yesterday".into();
        let adapter = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Asset(broken))));

        let err = adapter.last_modified("albums/cat.jpg").await.unwrap_err();
        assert!(matches!(
            err,
            FilesystemError::MetadataFailed {
                metadata_type: MetadataKind::LastModified,
                ..
            }
        ));
        assert!(adapter.metadata("albums/cat.jpg").await.is_err());
        assert_eq!(adapter.file_size("albums/cat.jpg").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn missing_metadata_is_not_found() {
        let adapter = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Missing)));
        let err = adapter.file_size("gone.png").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.operation(), Operation::RetrieveMetadata);
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_false() {
        let adapter = adapter_over(Arc::new(ScriptedStore::new(FetchScript::Missing)));
        assert!(!adapter.delete("gone.png").await.unwrap());
    }

    #[tokio::test]
    async fn cancelled_adapter_skips_store_calls() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());
        adapter.cancellation_token().cancel();

        let err = adapter
            .write("a.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, FilesystemError::WriteFailed { .. }));
        assert!(err.is_cancelled());
        assert_eq!(store.call_count("upload"), 0);

        let err = adapter.file_exists("a.png").await.unwrap_err();
        assert!(matches!(err, FilesystemError::CheckFailed { .. }));
    }

    #[tokio::test]
    async fn invalid_paths_are_rejected_before_the_store() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());

        let err = adapter.read("../secrets.txt").await.unwrap_err();
        assert!(matches!(err, FilesystemError::InvalidPath { .. }));
        assert_eq!(err.operation(), Operation::Read);
        assert_eq!(err.location(), "../secrets.txt");

        let err = adapter.write("/", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, FilesystemError::InvalidPath { .. }));

        let err = adapter.create_directory("").await.unwrap_err();
        assert_eq!(err.operation(), Operation::CreateDirectory);
        assert_eq!(store.call_count("upload") + store.call_count("create_folder"), 0);
    }

    #[tokio::test]
    async fn paths_are_normalized_before_classification() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());
        let asset = adapter
            .write("/docs//./2024\\report.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(asset.public_id, "docs/2024/report.pdf");
        assert_eq!(asset.resource_type, ResourceCategory::Raw);
        assert!(adapter.file_exists("docs/2024/report.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn read_uses_extension_as_delivery_format() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());
        adapter
            .write("albums/cat.png", Bytes::from_static(b"meow"))
            .await
            .unwrap();

        assert_eq!(
            adapter.url("albums/cat.png", &DeliveryOptions::new()).unwrap(),
            "memory://image/albums/cat.png"
        );
        assert_eq!(
            adapter
                .url("albums/cat.png", &DeliveryOptions::new().with_format("webp"))
                .unwrap(),
            "memory://image/albums/cat.webp"
        );
        assert_eq!(
            adapter.url("docs/a.pdf", &DeliveryOptions::new()).unwrap(),
            "memory://raw/docs/a.pdf"
        );
        assert_eq!(adapter.read("albums/cat.png").await.unwrap().as_ref(), b"meow");
    }

    #[tokio::test]
    async fn stream_write_and_read() {
        use futures::StreamExt;

        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"line one\n")),
            Ok(Bytes::from_static(b"line two\n")),
        ]);
        let asset = adapter
            .write_stream("notes/today.txt", Box::pin(chunks))
            .await
            .unwrap();
        assert_eq!(asset.bytes, 18);

        let mut stream = adapter.read_stream("notes/today.txt").await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"line one\nline two\n");
    }

    #[tokio::test]
    async fn rename_and_copy_compare_identifiers() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());
        adapter.write("a/cat.png", Bytes::from_static(b"cat")).await.unwrap();

        assert!(adapter.copy("a/cat.png", "b/cat.png").await.unwrap());
        assert!(adapter.rename("a/cat.png", "c/cat.png").await.unwrap());
        assert!(!adapter.file_exists("a/cat.png").await.unwrap());
        assert!(adapter.file_exists("b/cat.png").await.unwrap());
        assert_eq!(adapter.read("c/cat.png").await.unwrap().as_ref(), b"cat");

        let err = adapter.rename("missing.png", "other.png").await.unwrap_err();
        assert!(matches!(err, FilesystemError::MoveFailed { .. }));
        assert_eq!(err.destination(), Some("other.png"));

        let err = adapter.copy("missing.png", "other.png").await.unwrap_err();
        assert!(matches!(err, FilesystemError::CopyFailed { .. }));
    }

    #[tokio::test]
    async fn directories() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store.clone());

        assert!(adapter.directory_exists("").await.unwrap());
        assert!(!adapter.directory_exists("albums").await.unwrap());
        adapter.write("albums/cat.png", Bytes::from_static(b"x")).await.unwrap();
        assert!(adapter.directory_exists("albums").await.unwrap());
        assert!(adapter.directory_exists("/albums/").await.unwrap());
        assert!(!adapter.directory_exists("album").await.unwrap());

        adapter.create_directory("empty/").await.unwrap();
        assert!(store.has_folder("empty"));
        adapter.delete_directory("empty").await.unwrap();
        assert!(!store.has_folder("empty"));

        let err = adapter.delete_directory("albums").await.unwrap_err();
        assert!(matches!(
            err,
            FilesystemError::DirectoryOpFailed {
                operation: Operation::DeleteDirectory,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn mismatched_identifier_is_false() {
        let store = Arc::new(ScriptedStore::new(FetchScript::Missing).storing_as("b/cat_x7k2"));
        let adapter = adapter_over(store);

        assert!(!adapter.rename("a/cat.png", "b/cat.png").await.unwrap());
        assert!(!adapter.copy("a/cat.png", "b/cat.png").await.unwrap());

        let store = Arc::new(ScriptedStore::new(FetchScript::Missing).storing_as("b/cat"));
        let adapter = adapter_over(store);
        assert!(adapter.rename("a/cat.png", "b/cat.png").await.unwrap());
        assert!(adapter.copy("a/cat.png", "b/cat.png").await.unwrap());
    }

    #[tokio::test]
    async fn download_timeout_is_read_failure() {
        let store = Arc::new(ScriptedStore::new(FetchScript::Missing));
        let adapter = adapter_over(store);

        let err = adapter.read("albums/cat.png").await.unwrap_err();
        assert!(matches!(err, FilesystemError::ReadFailed { .. }), "{err:?}");
        assert!(matches!(err.store_error(), Some(StoreError::Timeout)));

        let err = adapter.read_stream("albums/cat.png").await.err().unwrap();
        assert!(matches!(err.store_error(), Some(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn listing_stops_at_directory_boundary() {
        let store = Arc::new(MemoryAssetStore::new());
        let adapter = adapter_over(store);
        for path in ["docs/a.png", "docs-archive/old.png", "docs.png"] {
            adapter.write(path, Bytes::from_static(b"x")).await.unwrap();
        }

        for prefix in ["docs/", "docs", "/docs"] {
            let contents = adapter.list_contents(prefix, true).await.unwrap();
            let paths: Vec<_> = contents.iter().map(|m| m.path.as_str()).collect();
            assert_eq!(paths, ["docs/a"], "{prefix}");
        }

        let everything = adapter.list_contents("", true).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert!(adapter.directory_exists("docs").await.unwrap());
        assert!(adapter.directory_exists("docs-archive").await.unwrap());
    }

    #[test]
    fn trailing_dot_has_no_delivery_format() {
        let adapter = adapter_over(Arc::new(MemoryAssetStore::new()));
        assert_eq!(
            adapter.url("a/b.", &DeliveryOptions::new()).unwrap(),
            "memory://image/a/b"
        );
    }

    #[test]
    fn visibility_is_unsupported() {
        let adapter = adapter_over(Arc::new(MemoryAssetStore::new()));
        let err = adapter.visibility("a.png").unwrap_err();
        assert!(matches!(
            err,
            FilesystemError::Unsupported {
                operation: Operation::Visibility,
                ..
            }
        ));
        let err = adapter
            .set_visibility("a.png", Visibility::Private)
            .unwrap_err();
        assert_eq!(err.operation(), Operation::SetVisibility);
    }
}
