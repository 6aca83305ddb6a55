//! Cloudinary asset store for Cirrus.
//!
//! This crate implements the [`AssetStore`](cirrus_store::AssetStore) trait
//! against the [Cloudinary Upload API](https://cloudinary.com/documentation/image_upload_api_reference)
//! for mutations and the [Admin API](https://cloudinary.com/documentation/admin_api)
//! for lookups, listings and folders.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cirrus_cloudinary::{CloudinaryConfig, CloudinaryStore};
//!
//! let config = CloudinaryConfig::new("demo", "api_key", "api_secret")
//!     .with_timeout_secs(10);
//! let store = CloudinaryStore::new(config).expect("valid HTTP client");
//! ```

pub mod config;
pub mod error;
pub mod signing;
pub mod store;
pub mod types;
pub mod url;

pub use config::CloudinaryConfig;
pub use error::CloudinaryError;
pub use signing::{SignatureAlgorithm, UploadParams};
pub use store::CloudinaryStore;
pub use types::{ApiErrorBody, ApiErrorDetail, PingResponse};
