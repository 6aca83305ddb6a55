use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::category::ResourceCategory;
use crate::error::CoreError;
use crate::identifier::AssetLocator;

/// An asset as described by the remote store.
///
/// Field names follow the store's JSON so responses deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    /// The store's primary key.
    pub public_id: String,

    /// Pipeline the asset lives under.
    pub resource_type: ResourceCategory,

    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,

    /// Creation time in the store's native format (RFC 3339).
    pub created_at: String,

    /// File extension as reported by the store. Raw assets usually have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Store-assigned version number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// HTTPS delivery URL, when the store includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
}

impl RemoteAsset {
    pub fn locator(&self) -> AssetLocator {
        AssetLocator::new(self.public_id.clone(), self.resource_type.clone())
    }

    pub fn mimetype(&self) -> String {
        derive_mimetype(&self.resource_type, self.format.as_deref())
    }

    pub fn timestamp(&self) -> Result<i64, CoreError> {
        derive_timestamp(&self.created_at)
    }
}

/// Kind of a listing entry. The store has no first-class directories, so
/// every entry is a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
}

/// The uniform metadata record handed to filesystem callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMetadata {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// The asset's public ID.
    pub path: String,
    pub size: u64,
    /// Creation time as Unix epoch seconds.
    pub timestamp: i64,
    pub mimetype: String,
}

impl TryFrom<&RemoteAsset> for NormalizedMetadata {
    type Error = CoreError;

    fn try_from(asset: &RemoteAsset) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: EntryKind::File,
            path: asset.public_id.clone(),
            size: asset.bytes,
            timestamp: asset.timestamp()?,
            mimetype: asset.mimetype(),
        })
    }
}

/// Build a MIME type from the category and the store-reported format.
///
/// The store reports JPEG images as `jpg`; the conventional subtype is
/// `jpeg`, so every `jpg` in the result is rewritten. Without a format the
/// result is the bare category name.
pub fn derive_mimetype(category: &ResourceCategory, format: Option<&str>) -> String {
    let mimetype = match format {
        Some(format) => format!("{category}/{format}"),
        None => category.to_string(),
    };
    mimetype.replace("jpg", "jpeg")
}

/// Parse a store creation time into Unix epoch seconds.
///
/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS` (read as UTC). Anything else
/// is an error rather than a silent default.
pub fn derive_timestamp(created_at: &str) -> Result<i64, CoreError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(created_at) {
        return Ok(parsed.timestamp());
    }
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc().timestamp())
        .map_err(|_| CoreError::InvalidTimestamp(created_at.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_asset() -> RemoteAsset {
        RemoteAsset {
            public_id: "albums/cat".into(),
            resource_type: ResourceCategory::Image,
            bytes: 2048,
            created_at: "2017-08-11T12:24:32Z".into(),
            format: Some("jpg".into()),
            version: Some(1_502_454_272),
            secure_url: None,
        }
    }

    #[test]
    fn mimetype_rewrites_jpg() {
        assert_eq!(
            derive_mimetype(&ResourceCategory::Image, Some("jpg")),
            "image/jpeg"
        );
        assert_eq!(
            derive_mimetype(&ResourceCategory::Image, Some("png")),
            "image/png"
        );
        assert_eq!(
            derive_mimetype(&ResourceCategory::Video, Some("mp4")),
            "video/mp4"
        );
    }

    #[test]
    fn mimetype_without_format_is_bare_category() {
        assert_eq!(derive_mimetype(&ResourceCategory::Raw, None), "raw");
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        assert_eq!(derive_timestamp("2017-08-11T12:24:32Z").unwrap(), 1_502_454_272);
        assert_eq!(
            derive_timestamp("2017-08-11T14:24:32+02:00").unwrap(),
            1_502_454_272
        );
    }

    #[test]
    fn timestamp_parses_space_separated_utc() {
        assert_eq!(derive_timestamp("2017-08-11 12:24:32").unwrap(), 1_502_454_272);
    }

    #[test]
    fn timestamp_rejects_garbage() {
        let err = derive_timestamp("last tuesday").unwrap_err();
        assert_eq!(err, CoreError::InvalidTimestamp("last tuesday".into()));
        assert!(derive_timestamp("").is_err());
    }

    #[test]
    fn normalized_metadata_from_asset() {
        let metadata = NormalizedMetadata::try_from(&sample_asset()).unwrap();
        assert_eq!(metadata.kind, EntryKind::File);
        assert_eq!(metadata.path, "albums/cat");
        assert_eq!(metadata.size, 2048);
        assert_eq!(metadata.timestamp, 1_502_454_272);
        assert_eq!(metadata.mimetype, "image/jpeg");
    }

    #[test]
    fn normalized_metadata_propagates_timestamp_error() {
        let mut asset = sample_asset();
        asset.created_at = "soon".into();
        assert!(NormalizedMetadata::try_from(&asset).is_err());
    }

    #[test]
    fn remote_asset_deserializes_store_json() {
        let json = r#"{
            "asset_id": "b5e6d2b39ba3e0869d67141ba7dba6cf",
            "public_id": "docs/report.pdf",
            "resource_type": "raw",
            "type": "upload",
            "bytes": 13264,
            "created_at": "2024-03-01T09:30:00Z",
            "version": 1709285400,
            "secure_url": "https://res.cloudinary.com/demo/raw/upload/v1709285400/docs/report.pdf"
        }"#;
        let asset: RemoteAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.public_id, "docs/report.pdf");
        assert_eq!(asset.resource_type, ResourceCategory::Raw);
        assert_eq!(asset.format, None);
        assert_eq!(asset.mimetype(), "raw");
        assert_eq!(
            asset.locator(),
            AssetLocator::new("docs/report.pdf", ResourceCategory::Raw)
        );
    }

    #[test]
    fn normalized_metadata_serializes_type_field() {
        let metadata = NormalizedMetadata::try_from(&sample_asset()).unwrap();
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["mimetype"], "image/jpeg");
    }
}
