use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::category::{ClassificationTable, ResourceCategory};
use crate::path::PathInfo;

/// Derive the store's public ID for `path`.
///
/// The `raw` category keeps the extension because the store only strips
/// extensions from non-raw public IDs. The directory part is prepended
/// unless the path has none.
pub fn build_identifier(path: &str, category: &ResourceCategory) -> String {
    let info = PathInfo::parse(path);
    let name = if category.is_raw() {
        info.basename
    } else {
        info.filename
    };

    match info.dirname {
        "." => name.to_owned(),
        "/" => format!("/{name}"),
        dir => format!("{dir}/{name}"),
    }
}

/// The store key for a path: public ID plus the category it lives under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetLocator {
    pub identifier: String,
    pub category: ResourceCategory,
}

impl AssetLocator {
    pub fn new(identifier: impl Into<String>, category: ResourceCategory) -> Self {
        Self {
            identifier: identifier.into(),
            category,
        }
    }
}

/// Classifies paths and derives their locators against a fixed table.
///
/// Cloning is cheap; the table is shared.
#[derive(Debug, Clone, Default)]
pub struct PathMapper {
    table: Arc<ClassificationTable>,
}

impl PathMapper {
    pub fn new(table: ClassificationTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    /// Category for the path's extension.
    pub fn category_of(&self, path: &str) -> ResourceCategory {
        let info = PathInfo::parse(path);
        self.table.classify(info.extension.unwrap_or_default())
    }

    /// Public ID for the path under its own category.
    pub fn identifier_of(&self, path: &str) -> String {
        build_identifier(path, &self.category_of(path))
    }

    /// Classify and identify in one step.
    pub fn locate(&self, path: &str) -> AssetLocator {
        let category = self.category_of(path);
        let identifier = build_identifier(path, &category);
        AssetLocator {
            identifier,
            category,
        }
    }
}
