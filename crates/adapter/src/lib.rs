//! Filesystem operations over a remote asset store.
//!
//! [`CloudAdapter`] maps paths onto the store's public IDs and categories and
//! implements the [`Filesystem`] contract. Failures carry the operation and
//! location as a [`FilesystemError`]; [`LenientAdapter`] collapses them into
//! `bool`/`Option` results for callers that only need success or failure.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use cirrus_adapter::{AdapterConfig, CloudAdapter, Filesystem};
//! use cirrus_core::{ClassificationTable, ResourceCategory};
//! # async fn demo(store: Arc<dyn cirrus_store::AssetStore>) -> Result<(), cirrus_adapter::FilesystemError> {
//! let config = AdapterConfig::new().with_extensions(
//!     ClassificationTable::new().with_category(ResourceCategory::Raw, ["pdf"]),
//! );
//! let fs = CloudAdapter::new(store, config);
//! fs.write("docs/report.pdf", Bytes::from_static(b"%PDF-1.7")).await?;
//! assert!(fs.file_exists("docs/report.pdf").await?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod lenient;

pub use adapter::CloudAdapter;
pub use config::AdapterConfig;
pub use error::{ErrorCause, FilesystemError, MetadataKind, Operation};
pub use filesystem::{Filesystem, Visibility};
pub use lenient::LenientAdapter;
