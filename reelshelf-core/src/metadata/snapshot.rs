//! Flat text snapshot of the metadata map.
//!
//! One record per line, three space separated fields:
//!
//! ```text
//! <base64url identity> <progress or _> <duration seconds or _>
//! ```

use std::{
    collections::HashMap,
    ffi::OsString,
    fs, io,
    num::{ParseFloatError, ParseIntError},
    path::{Path, PathBuf},
};

use reelshelf_model::MetadataRecord;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::identity::{FileIdentity, IdentityError};

/// Placeholder written for an absent optional field.
pub const ABSENT: &str = "_";

#[derive(Error, Debug)]
pub enum SnapshotLineError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("invalid progress: {0}")]
    Progress(#[from] ParseFloatError),
    #[error("invalid duration: {0}")]
    Duration(#[from] ParseIntError),
}

pub fn encode_line(id: &FileIdentity, record: &MetadataRecord) -> String {
    let progress = record
        .progress
        .map(|p| p.to_string())
        .unwrap_or_else(|| ABSENT.to_string());
    let duration = record
        .duration_seconds
        .map(|d| d.to_string())
        .unwrap_or_else(|| ABSENT.to_string());
    format!("{} {} {}", id.encode(), progress, duration)
}

pub fn decode_line(
    line: &str,
) -> Result<(FileIdentity, MetadataRecord), SnapshotLineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [id, progress, duration] = fields[..] else {
        return Err(SnapshotLineError::FieldCount(fields.len()));
    };

    let id = FileIdentity::decode(id)?;
    let progress = match progress {
        ABSENT => None,
        value => Some(value.parse::<f32>()?),
    };
    let duration_seconds = match duration {
        ABSENT => None,
        value => Some(value.parse::<u32>()?),
    };

    Ok((
        id,
        MetadataRecord {
            progress,
            duration_seconds,
        },
    ))
}

/// Parse a whole snapshot. Bad lines are logged and skipped.
pub fn parse_snapshot(contents: &str) -> HashMap<FileIdentity, MetadataRecord> {
    let mut records = HashMap::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok((id, record)) => {
                records.insert(id, record);
            }
            Err(err) => {
                warn!(line = index + 1, "skipping malformed metadata line: {err}");
            }
        }
    }
    records
}

/// Render entries sorted by identity so successive snapshots diff cleanly.
pub fn render_snapshot(
    mut entries: Vec<(FileIdentity, MetadataRecord)>,
) -> String {
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    let mut out = String::with_capacity(entries.len() * 36);
    for (id, record) in &entries {
        out.push_str(&encode_line(id, record));
        out.push('\n');
    }
    out
}

/// Location of the persisted snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot once at startup. A missing file is an empty cache.
    pub fn load(&self) -> io::Result<HashMap<FileIdentity, MetadataRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no metadata snapshot yet");
                return Ok(HashMap::new());
            }
            Err(err) => return Err(err),
        };

        let records = parse_snapshot(&contents);
        info!(
            path = %self.path.display(),
            records = records.len(),
            "loaded metadata snapshot"
        );
        Ok(records)
    }

    /// Replace the snapshot atomically (temp file + rename), creating the
    /// parent directory on demand.
    pub async fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_use_placeholder() {
        let id = FileIdentity::compute("a.mp4", 10);
        let line = encode_line(&id, &MetadataRecord::with_duration(93));
        assert_eq!(line, format!("{} _ 93", id.encode()));

        let line = encode_line(&id, &MetadataRecord::with_progress(0.5));
        assert_eq!(line, format!("{} 0.5 _", id.encode()));
    }

    #[test]
    fn decode_reads_back_both_fields() {
        let id = FileIdentity::compute("b.mkv", 2048);
        let (decoded_id, record) =
            decode_line(&format!("{} 0.75 3600", id.encode())).unwrap();
        assert_eq!(decoded_id, id);
        assert_eq!(record.progress, Some(0.75));
        assert_eq!(record.duration_seconds, Some(3600));
    }

    #[test]
    fn decode_rejects_bad_lines() {
        let id = FileIdentity::compute("c.mkv", 1).encode();
        assert!(matches!(
            decode_line(&id),
            Err(SnapshotLineError::FieldCount(1))
        ));
        assert!(matches!(
            decode_line(&format!("{id} abc _")),
            Err(SnapshotLineError::Progress(_))
        ));
        assert!(matches!(
            decode_line(&format!("{id} _ -5")),
            Err(SnapshotLineError::Duration(_))
        ));
        assert!(matches!(
            decode_line("%%% _ _"),
            Err(SnapshotLineError::Identity(_))
        ));
    }

    #[test]
    fn parse_skips_malformed_lines_and_keeps_the_rest() {
        let good_a = FileIdentity::compute("a.mp4", 1);
        let good_b = FileIdentity::compute("b.mp4", 2);
        let contents = format!(
            "{} 0.1 _\ngarbage line here\n\n{} _ 42\n{} 0.2\n",
            good_a.encode(),
            good_b.encode(),
            good_b.encode(),
        );

        let records = parse_snapshot(&contents);
        assert_eq!(records.len(), 2);
        assert_eq!(records[&good_a].progress, Some(0.1));
        assert_eq!(records[&good_b].duration_seconds, Some(42));
    }

    #[test]
    fn render_is_sorted_and_newline_terminated() {
        let a = FileIdentity::compute("a.mp4", 1);
        let b = FileIdentity::compute("b.mp4", 2);
        let rendered = render_snapshot(vec![
            (b, MetadataRecord::with_duration(5)),
            (a, MetadataRecord::with_progress(1.0)),
        ]);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(rendered.ends_with('\n'));
        let (first, _) = decode_line(lines[0]).unwrap();
        assert_eq!(first, a.min(b));
        assert_eq!(parse_snapshot(&rendered).len(), 2);
    }

    #[tokio::test]
    async fn write_creates_parent_directory_and_load_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("metadata/fileinfos.txt"));

        assert!(file.load().unwrap().is_empty());

        let id = FileIdentity::compute("movie.mkv", 77);
        let contents =
            render_snapshot(vec![(id, MetadataRecord::with_duration(120))]);
        file.write(&contents).await.unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded[&id].duration_seconds, Some(120));
        assert!(!dir.path().join("metadata/fileinfos.txt.tmp").exists());
    }
}
