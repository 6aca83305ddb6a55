use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Coarse content classification the store uses to pick its processing and
/// delivery pipeline.
///
/// Categories other than the three built-in ones are carried verbatim in
/// [`ResourceCategory::Other`] so a configuration can name any pipeline the
/// store understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ResourceCategory {
    /// Still images. The default for unclassified extensions.
    #[default]
    Image,
    /// Video and audio.
    Video,
    /// Anything stored byte-for-byte. Public IDs keep their extension.
    Raw,
    /// A user-defined category name.
    Other(String),
}

impl ResourceCategory {
    /// The lowercase name used on the wire and in configuration.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the `raw` category.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw)
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResourceCategory {
    fn from(name: &str) -> Self {
        match name {
            "image" => Self::Image,
            "video" => Self::Video,
            "raw" => Self::Raw,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ResourceCategory {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl Serialize for ResourceCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name))
    }
}

/// Ordered mapping from category to the extensions it claims.
///
/// Order is significant: when two categories list the same extension, the
/// one configured first wins. Deserialization keeps the order in which the
/// categories appear in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationTable {
    entries: Vec<(ResourceCategory, Vec<String>)>,
}

impl ClassificationTable {
    /// Create an empty table. Every extension classifies as `image`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append extensions to a category.
    ///
    /// A category that is already present keeps its original position and
    /// gains the new extensions.
    #[must_use]
    pub fn with_category<I, S>(mut self, category: ResourceCategory, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(category, extensions);
        self
    }

    fn insert<I, S>(&mut self, category: ResourceCategory, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions.into_iter().map(Into::into);
        if let Some((_, existing)) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            existing.extend(extensions);
        } else {
            self.entries.push((category, extensions.collect()));
        }
    }

    /// Resolve the category for an extension (without the leading dot).
    ///
    /// Returns [`ResourceCategory::Image`] when no configured category claims
    /// the extension, including for the empty extension.
    pub fn classify(&self, extension: &str) -> ResourceCategory {
        if extension.is_empty() {
            return ResourceCategory::default();
        }
        self.entries
            .iter()
            .find(|(_, extensions)| extensions.iter().any(|e| e == extension))
            .map_or_else(ResourceCategory::default, |(category, _)| category.clone())
    }

    /// Categories in configuration order.
    pub fn categories(&self) -> impl Iterator<Item = &ResourceCategory> {
        self.entries.iter().map(|(category, _)| category)
    }

    /// Extensions claimed by a category, if it is configured.
    pub fn extensions(&self, category: &ResourceCategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, extensions)| extensions.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Free-function form of [`ClassificationTable::classify`].
pub fn classify(extension: &str, table: &ClassificationTable) -> ResourceCategory {
    table.classify(extension)
}

impl FromIterator<(ResourceCategory, Vec<String>)> for ClassificationTable {
    fn from_iter<T: IntoIterator<Item = (ResourceCategory, Vec<String>)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (category, extensions) in iter {
            table.insert(category, extensions);
        }
        table
    }
}

impl Serialize for ClassificationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, extensions) in &self.entries {
            map.serialize_entry(category.as_str(), extensions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassificationTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ClassificationTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to a list of extensions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = ClassificationTable::new();
                while let Some((category, extensions)) =
                    access.next_entry::<ResourceCategory, Vec<String>>()?
                {
                    table.insert(category, extensions);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
