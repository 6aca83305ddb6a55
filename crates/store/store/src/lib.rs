pub mod error;
pub mod store;
pub mod testing;
pub mod types;

pub use error::StoreError;
pub use store::AssetStore;
pub use types::{
    AssetPage, ByteStream, DeliveryOptions, DestroyOutcome, ListQuery, UploadOptions, UploadSource,
};
