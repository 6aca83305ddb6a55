use std::collections::HashSet;

use bytes::Bytes;
use cirrus_core::{AssetLocator, ResourceCategory};

use crate::error::StoreError;
use crate::store::AssetStore;
use crate::types::{DeliveryOptions, ListQuery, UploadOptions, UploadSource};

fn image(id: &str) -> AssetLocator {
    AssetLocator::new(format!("conformance/{id}"), ResourceCategory::Image)
}

/// Run the full asset store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any store call fails unexpectedly.
pub async fn run_store_conformance_tests(store: &dyn AssetStore) -> Result<(), StoreError> {
    test_fetch_missing(store).await?;
    test_upload_and_fetch(store).await?;
    test_upload_stream(store).await?;
    test_download_delivery_url(store).await?;
    test_rename(store).await?;
    test_destroy(store).await?;
    test_copy_from_url(store).await?;
    test_list_pagination(store).await?;
    test_folders(store).await?;
    Ok(())
}

async fn test_fetch_missing(store: &dyn AssetStore) -> Result<(), StoreError> {
    let err = store
        .fetch_asset(&image("missing"))
        .await
        .expect_err("fetching a missing asset should fail");
    assert!(err.is_not_found(), "missing asset should be NotFound, got {err}");
    Ok(())
}

async fn test_upload_and_fetch(store: &dyn AssetStore) -> Result<(), StoreError> {
    let locator = image("photo");
    let uploaded = store
        .upload(
            UploadSource::Bytes(Bytes::from_static(b"png-bytes")),
            &locator,
            &UploadOptions::for_write("photo.png"),
        )
        .await?;
    assert_eq!(uploaded.public_id, locator.identifier);
    assert_eq!(uploaded.resource_type, ResourceCategory::Image);

    let fetched = store.fetch_asset(&locator).await?;
    assert_eq!(fetched.public_id, locator.identifier);
    assert_eq!(fetched.bytes, 9);
    assert_eq!(fetched.format.as_deref(), Some("png"));
    Ok(())
}

async fn test_upload_stream(store: &dyn AssetStore) -> Result<(), StoreError> {
    let locator = AssetLocator::new("conformance/notes.txt", ResourceCategory::Raw);
    let chunks = vec![
        Ok(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ];
    let uploaded = store
        .upload(
            UploadSource::from_stream(futures::stream::iter(chunks)),
            &locator,
            &UploadOptions::for_write("notes.txt"),
        )
        .await?;
    assert_eq!(uploaded.bytes, 11);
    assert_eq!(uploaded.resource_type, ResourceCategory::Raw);
    Ok(())
}

async fn test_download_delivery_url(store: &dyn AssetStore) -> Result<(), StoreError> {
    let locator = image("download");
    store
        .upload(
            UploadSource::Bytes(Bytes::from_static(b"pixels")),
            &locator,
            &UploadOptions::for_write("download.png"),
        )
        .await?;
    let url = store.delivery_url(&locator, &DeliveryOptions::new().with_format("png"));
    let body = store.download(&url).await?;
    assert_eq!(body.as_ref(), b"pixels");

    let missing = store.delivery_url(&image("nope"), &DeliveryOptions::new());
    let err = store
        .download(&missing)
        .await
        .expect_err("downloading a missing asset should fail");
    assert!(err.is_not_found(), "missing download should be NotFound, got {err}");
    Ok(())
}

async fn test_rename(store: &dyn AssetStore) -> Result<(), StoreError> {
    let from = image("before");
    store
        .upload(
            UploadSource::Bytes(Bytes::from_static(b"x")),
            &from,
            &UploadOptions::for_write("before.png"),
        )
        .await?;
    let renamed = store
        .rename(
            &from.identifier,
            "conformance/after",
            &ResourceCategory::Image,
        )
        .await?;
    assert_eq!(renamed.public_id, "conformance/after");
    assert!(store.fetch_asset(&from).await.is_err_and(|e| e.is_not_found()));
    store.fetch_asset(&image("after")).await?;

    let err = store
        .rename("conformance/ghost", "conformance/ghost2", &ResourceCategory::Image)
        .await
        .expect_err("renaming a missing asset should fail");
    assert!(err.is_not_found(), "rename of missing asset should be NotFound, got {err}");
    Ok(())
}

async fn test_destroy(store: &dyn AssetStore) -> Result<(), StoreError> {
    let locator = image("doomed");
    store
        .upload(
            UploadSource::Bytes(Bytes::from_static(b"x")),
            &locator,
            &UploadOptions::for_write("doomed.png"),
        )
        .await?;
    let outcome = store.destroy(&locator, true).await?;
    assert!(outcome.is_ok(), "destroying an existing asset should be ok");

    let outcome = store.destroy(&locator, true).await?;
    assert!(!outcome.is_ok(), "destroying a missing asset should not be ok");
    Ok(())
}

async fn test_copy_from_url(store: &dyn AssetStore) -> Result<(), StoreError> {
    let original = image("original");
    store
        .upload(
            UploadSource::Bytes(Bytes::from_static(b"copy-me")),
            &original,
            &UploadOptions::for_write("original.png"),
        )
        .await?;
    let url = store.delivery_url(&original, &DeliveryOptions::new().with_format("png"));

    let copy = image("duplicate");
    let copied = store
        .upload(UploadSource::Url(url), &copy, &UploadOptions::default())
        .await?;
    assert_eq!(copied.public_id, copy.identifier);
    assert_eq!(copied.bytes, 7);
    store.fetch_asset(&original).await?;
    Ok(())
}

async fn test_list_pagination(store: &dyn AssetStore) -> Result<(), StoreError> {
    let expected: HashSet<String> = (0..5).map(|i| format!("listing/item-{i}")).collect();
    for id in &expected {
        store
            .upload(
                UploadSource::Bytes(Bytes::from_static(b"x")),
                &AssetLocator::new(id.clone(), ResourceCategory::Image),
                &UploadOptions::for_write("item.png"),
            )
            .await?;
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let query = ListQuery::new("listing/")
            .with_max_results(2)
            .with_cursor(cursor.take());
        let page = store.list_assets(&query).await?;
        assert!(page.assets.len() <= 2, "page exceeded max_results");
        seen.extend(page.assets.into_iter().map(|a| a.public_id));
        pages += 1;
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
        assert!(pages < 10, "pagination did not terminate");
    }

    let unique: HashSet<String> = seen.iter().cloned().collect();
    assert_eq!(seen.len(), unique.len(), "pages must not repeat assets");
    assert_eq!(unique, expected);
    assert_eq!(pages, 3);
    Ok(())
}

async fn test_folders(store: &dyn AssetStore) -> Result<(), StoreError> {
    store.create_folder("conformance/folder").await?;
    store.delete_folder("conformance/folder").await?;
    Ok(())
}
