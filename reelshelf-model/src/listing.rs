//! Response shapes for directory queries.
//!
//! Field names serialize in camelCase to stay wire compatible with the
//! browser front end.

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A media file in a directory listing, enriched with cached metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MediaEntry {
    pub file_name: String,
    pub file_size: u64,
    pub modify_date: Option<DateTime<Utc>>,
    /// Only present when already cached (or freshly computed for single-file lookups)
    pub duration: Option<u32>,
    pub progress: Option<f32>,
}

/// A sub-folder in a directory listing with recursive media totals.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FolderEntry {
    pub folder_name: String,
    pub media_file_count: u64,
    pub media_disk_size: u64,
    pub modify_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DirectoryListing {
    pub folder_infos: Vec<FolderEntry>,
    pub media_infos: Vec<MediaEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MediaDuration {
    pub file_name: String,
    pub duration: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DurationsResponse {
    pub path: String,
    pub media_durations: Vec<MediaDuration>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn media_entry_uses_front_end_field_names() {
        let entry = MediaEntry {
            file_name: "a.mp4".into(),
            file_size: 10,
            modify_date: None,
            duration: Some(12),
            progress: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["fileName"], "a.mp4");
        assert_eq!(json["fileSize"], 10);
        assert_eq!(json["duration"], 12);
        assert!(json["progress"].is_null());
    }
}
