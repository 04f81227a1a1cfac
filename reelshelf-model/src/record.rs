#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cached measurements for a single file identity.
///
/// Both fields are optional and independent: a file may have a known watch
/// position before its duration has ever been probed, and vice versa. An
/// absent field means "unknown", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MetadataRecord {
    /// Watch progress in `[0, 1]`
    pub progress: Option<f32>,
    pub duration_seconds: Option<u32>,
}

impl MetadataRecord {
    pub fn with_progress(progress: f32) -> Self {
        Self {
            progress: Some(progress),
            duration_seconds: None,
        }
    }

    pub fn with_duration(duration_seconds: u32) -> Self {
        Self {
            progress: None,
            duration_seconds: Some(duration_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_leave_the_other_field_unknown() {
        let progress = MetadataRecord::with_progress(0.25);
        assert_eq!(progress.progress, Some(0.25));
        assert_eq!(progress.duration_seconds, None);

        let duration = MetadataRecord::with_duration(90);
        assert_eq!(duration.progress, None);
        assert_eq!(duration.duration_seconds, Some(90));

        let unknown = MetadataRecord::default();
        assert_eq!(unknown.progress, None);
        assert_eq!(unknown.duration_seconds, None);
    }
}
