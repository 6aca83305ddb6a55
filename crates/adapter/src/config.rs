use cirrus_core::{ClassificationTable, ResourceCategory};
use cirrus_store::ListQuery;
use serde::{Deserialize, Serialize};

/// Adapter settings, the `[disk]` section of a disk configuration file.
///
/// ```toml
/// page_size = 500
/// list_categories = ["image", "raw"]
///
/// [extensions]
/// video = ["mp4", "mov"]
/// raw = ["pdf", "zip"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Extension table used to pick each path's category. Earlier entries
    /// win when extensions overlap.
    pub extensions: ClassificationTable,

    /// Page size for listing calls, capped at [`ListQuery::MAX_PAGE_SIZE`].
    pub page_size: u32,

    /// Categories scanned, in order, by `list_contents` and
    /// `directory_exists`.
    pub list_categories: Vec<ResourceCategory>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            extensions: ClassificationTable::new(),
            page_size: ListQuery::MAX_PAGE_SIZE,
            list_categories: vec![ResourceCategory::Image],
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: ClassificationTable) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_list_categories(
        mut self,
        categories: impl IntoIterator<Item = ResourceCategory>,
    ) -> Self {
        self.list_categories = categories.into_iter().collect();
        self
    }

    /// The page size actually sent to the store.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, ListQuery::MAX_PAGE_SIZE)
    }
}
