//! Core types for the Cirrus filesystem adapter.
//!
//! Everything in this crate is a pure function of a path and a small static
//! configuration table:
//!
//! - [`ClassificationTable`] maps a file extension to a [`ResourceCategory`]
//!   (`image`, `video`, `raw`, or a user-defined category).
//! - [`build_identifier`] derives the remote public ID for a path. The `raw`
//!   category keeps the file extension; every other category drops it.
//! - [`PathMapper`] combines both into an [`AssetLocator`].
//! - [`RemoteAsset`] and [`NormalizedMetadata`] describe what the store
//!   returns and what filesystem callers receive.

pub mod asset;
pub mod category;
pub mod error;
pub mod identifier;
pub mod path;

pub use asset::{EntryKind, NormalizedMetadata, RemoteAsset, derive_mimetype, derive_timestamp};
pub use category::{ClassificationTable, ResourceCategory, classify};
pub use error::CoreError;
pub use identifier::{AssetLocator, PathMapper, build_identifier};
pub use path::{PathInfo, normalize};
