mod store;

pub use store::MemoryAssetStore;
