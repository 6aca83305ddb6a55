use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use cirrus_core::{AssetLocator, PathInfo, RemoteAsset, ResourceCategory};
use cirrus_store::{
    AssetPage, AssetStore, ByteStream, DeliveryOptions, DestroyOutcome, ListQuery, StoreError,
    UploadOptions, UploadSource,
};

use crate::config::CloudinaryConfig;
use crate::error::CloudinaryError;
use crate::signing::UploadParams;
use crate::types::{ApiErrorBody, PingResponse};
use crate::url::{delivery_url, encode_path};

/// Asset store that talks to Cloudinary over HTTP.
///
/// Mutations (upload, rename, destroy) go through the signed Upload API;
/// lookups, listings and folders go through the Admin API with basic auth.
pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: Client,
}

impl CloudinaryStore {
    /// Create a store with a `reqwest::Client` using the configured timeout.
    pub fn new(config: CloudinaryConfig) -> Result<Self, CloudinaryError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a store with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool.
    pub fn with_client(config: CloudinaryConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    /// `{base}/v1_1/{cloud}/{category}/{action}` on the Upload API.
    fn upload_api_url(&self, category: &ResourceCategory, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{category}/{action}",
            self.config.api_base_url, self.config.cloud_name
        )
    }

    /// `{base}/v1_1/{cloud}/{path}` on the Admin API.
    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/v1_1/{}/{path}",
            self.config.api_base_url, self.config.cloud_name
        )
    }

    fn resource_url(&self, locator: &AssetLocator) -> String {
        self.admin_url(&format!(
            "resources/{}/upload/{}",
            locator.category,
            encode_path(&locator.identifier)
        ))
    }

    fn folder_url(&self, name: &str) -> String {
        self.admin_url(&format!("folders/{}", encode_path(name.trim_matches('/'))))
    }

    fn sign(&self, params: UploadParams) -> Vec<(String, String)> {
        params.into_signed(
            &self.config.api_key,
            &self.config.api_secret,
            Utc::now().timestamp(),
            self.config.signature_algorithm,
        )
    }

    fn admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.config.api_key, Some(&self.config.api_secret))
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(request: RequestBuilder) -> Result<Response, CloudinaryError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Cloudinary API rate limit hit");
            return Err(CloudinaryError::RateLimited);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ApiErrorBody::message_from(&body).unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            debug!(%message, "Cloudinary resource not found");
            return Err(CloudinaryError::NotFound(message));
        }

        error!(%status, %message, "Cloudinary request failed");
        Err(CloudinaryError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CloudinaryError> {
        let response = Self::send(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CloudinaryError::InvalidResponse(e.to_string()))
    }

    /// POST a signed form to an Upload API action.
    async fn post_signed<T: DeserializeOwned>(
        &self,
        category: &ResourceCategory,
        action: &str,
        params: UploadParams,
    ) -> Result<T, CloudinaryError> {
        let url = self.upload_api_url(category, action);
        debug!(%url, "calling Cloudinary Upload API");
        Self::send_json(self.client.post(&url).form(&self.sign(params))).await
    }

    async fn do_upload(
        &self,
        source: UploadSource,
        target: &AssetLocator,
        options: &UploadOptions,
    ) -> Result<RemoteAsset, CloudinaryError> {
        let params = UploadParams::new()
            .with("public_id", &target.identifier)
            .with("use_filename", options.use_filename)
            .with("unique_filename", options.unique_filename)
            .with("overwrite", true);

        let file_name = options
            .filename
            .clone()
            .unwrap_or_else(|| PathInfo::parse(&target.identifier).basename.to_owned());

        let mut form = Form::new();
        for (key, value) in self.sign(params) {
            form = form.text(key, value);
        }
        form = match source {
            UploadSource::Bytes(bytes) => {
                form.part("file", Part::stream(bytes).file_name(file_name))
            }
            UploadSource::Stream(stream) => form.part(
                "file",
                Part::stream(Body::wrap_stream(stream)).file_name(file_name),
            ),
            UploadSource::Url(url) => form.text("file", url),
        };

        let url = self.upload_api_url(&target.category, "upload");
        debug!(%url, "uploading to Cloudinary");
        let asset: RemoteAsset =
            Self::send_json(self.client.post(&url).multipart(form)).await?;
        info!(public_id = %asset.public_id, bytes = asset.bytes, "asset uploaded");
        Ok(asset)
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    #[instrument(
        skip(self, source, options),
        fields(identifier = %target.identifier, category = %target.category, source = source.kind())
    )]
    async fn upload(
        &self,
        source: UploadSource,
        target: &AssetLocator,
        options: &UploadOptions,
    ) -> Result<RemoteAsset, StoreError> {
        Ok(self.do_upload(source, target, options).await?)
    }

    #[instrument(skip(self, category), fields(category = %category))]
    async fn rename(
        &self,
        from: &str,
        to: &str,
        category: &ResourceCategory,
    ) -> Result<RemoteAsset, StoreError> {
        let params = UploadParams::new()
            .with("from_public_id", from)
            .with("to_public_id", to);
        let asset: RemoteAsset = self.post_signed(category, "rename", params).await?;
        info!(public_id = %asset.public_id, "asset renamed");
        Ok(asset)
    }

    #[instrument(skip(self, locator), fields(identifier = %locator.identifier, category = %locator.category))]
    async fn destroy(
        &self,
        locator: &AssetLocator,
        invalidate: bool,
    ) -> Result<DestroyOutcome, StoreError> {
        let params = UploadParams::new()
            .with("public_id", &locator.identifier)
            .with("invalidate", invalidate);
        let outcome: DestroyOutcome = self
            .post_signed(&locator.category, "destroy", params)
            .await?;
        info!(result = %outcome.result, "asset destroy answered");
        Ok(outcome)
    }

    #[instrument(skip(self, locator), fields(identifier = %locator.identifier, category = %locator.category))]
    async fn fetch_asset(&self, locator: &AssetLocator) -> Result<RemoteAsset, StoreError> {
        let url = self.resource_url(locator);
        debug!(%url, "fetching asset details");
        Ok(Self::send_json(self.admin(self.client.get(&url))).await?)
    }

    #[instrument(skip(self, query), fields(prefix = %query.prefix, category = %query.category))]
    async fn list_assets(&self, query: &ListQuery) -> Result<AssetPage, StoreError> {
        let url = self.admin_url(&format!("resources/{}/upload", query.category));

        let mut params: Vec<(&str, String)> = vec![("max_results", query.max_results.to_string())];
        if !query.prefix.is_empty() {
            params.push(("prefix", query.prefix.clone()));
        }
        if let Some(cursor) = &query.next_cursor {
            params.push(("next_cursor", cursor.clone()));
        }

        debug!(%url, cursor = ?query.next_cursor, "listing assets");
        let page: AssetPage = Self::send_json(self.admin(self.client.get(&url).query(&params))).await?;
        debug!(count = page.assets.len(), more = page.next_cursor.is_some(), "listing page received");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn create_folder(&self, name: &str) -> Result<(), StoreError> {
        let url = self.folder_url(name);
        Self::send(self.admin(self.client.post(&url))).await?;
        info!("folder created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_folder(&self, name: &str) -> Result<(), StoreError> {
        let url = self.folder_url(name);
        Self::send(self.admin(self.client.delete(&url))).await?;
        info!("folder deleted");
        Ok(())
    }

    fn delivery_url(&self, locator: &AssetLocator, options: &DeliveryOptions) -> String {
        delivery_url(&self.config, locator, options)
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Bytes, StoreError> {
        let response = Self::send(self.client.get(url)).await?;
        Ok(response.bytes().await.map_err(CloudinaryError::from)?)
    }

    #[instrument(skip(self))]
    async fn download_stream(&self, url: &str) -> Result<ByteStream, StoreError> {
        let response = Self::send(self.client.get(url)).await?;
        Ok(Box::pin(response.bytes_stream().map_err(std::io::Error::other)))
    }

    #[instrument(skip(self), fields(cloud = %self.config.cloud_name))]
    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.admin_url("ping");
        debug!("performing Cloudinary health check");
        let response: PingResponse = Self::send_json(self.admin(self.client.get(&url))).await?;
        if response.status != "ok" {
            return Err(StoreError::InvalidResponse(format!(
                "unexpected ping status: {}",
                response.status
            )));
        }
        debug!("Cloudinary health check passed");
        Ok(())
    }
}
