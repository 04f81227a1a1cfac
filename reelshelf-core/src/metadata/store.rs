use std::{
    collections::HashMap,
    fmt, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::RwLock;
use reelshelf_model::MetadataRecord;
use tracing::{debug, error};

use super::{
    flush::{DebouncedFlush, FlushPolicy, FlushTarget},
    snapshot::{SnapshotFile, render_snapshot},
};
use crate::identity::FileIdentity;

type RecordMap = HashMap<FileIdentity, MetadataRecord>;

struct StoreInner {
    records: RwLock<RecordMap>,
    snapshot: SnapshotFile,
}

#[async_trait]
impl FlushTarget for StoreInner {
    async fn flush(&self) {
        let entries: Vec<(FileIdentity, MetadataRecord)> = self
            .records
            .read()
            .iter()
            .map(|(id, record)| (*id, *record))
            .collect();
        let count = entries.len();
        let contents = render_snapshot(entries);

        match self.snapshot.write(&contents).await {
            Ok(()) => debug!(
                path = %self.snapshot.path().display(),
                records = count,
                "metadata snapshot saved"
            ),
            Err(err) => error!(
                path = %self.snapshot.path().display(),
                "failed to save metadata snapshot: {err}"
            ),
        }
    }
}

/// Identity keyed cache of watch progress and durations.
///
/// Reads take a shared lock and never wait on persistence. Every mutation
/// schedules a debounced save of the full map; save failures are logged and
/// never reach the caller.
pub struct MetadataStore {
    inner: Arc<StoreInner>,
    flusher: DebouncedFlush,
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataStore")
            .field("path", &self.inner.snapshot.path())
            .field("records", &self.len())
            .field("flusher", &self.flusher)
            .finish()
    }
}

impl MetadataStore {
    /// Load the snapshot at `path` (if any) and start the flush scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        path: impl Into<PathBuf>,
        policy: FlushPolicy,
    ) -> io::Result<Self> {
        let snapshot = SnapshotFile::new(path);
        let records = snapshot.load()?;
        Ok(Self::with_records(snapshot, records, policy))
    }

    fn with_records(
        snapshot: SnapshotFile,
        records: RecordMap,
        policy: FlushPolicy,
    ) -> Self {
        let inner = Arc::new(StoreInner {
            records: RwLock::new(records),
            snapshot,
        });
        let flusher = DebouncedFlush::spawn(inner.clone(), policy);
        Self { inner, flusher }
    }

    pub fn path(&self) -> &Path {
        self.inner.snapshot.path()
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }

    pub fn get_record(&self, id: &FileIdentity) -> Option<MetadataRecord> {
        self.inner.records.read().get(id).copied()
    }

    pub fn cached_duration(&self, id: &FileIdentity) -> Option<u32> {
        self.get_record(id).and_then(|record| record.duration_seconds)
    }

    /// Callers are responsible for rejecting NaN.
    pub fn set_progress(&self, id: FileIdentity, progress: f32) {
        self.inner
            .records
            .write()
            .entry(id)
            .or_default()
            .progress = Some(progress);
        self.flusher.schedule_flush();
    }

    pub fn set_duration(&self, id: FileIdentity, seconds: u32) {
        self.inner
            .records
            .write()
            .entry(id)
            .or_default()
            .duration_seconds = Some(seconds);
        self.flusher.schedule_flush();
    }

    /// Drop everything known about a deleted file.
    pub fn remove(&self, id: &FileIdentity) -> Option<MetadataRecord> {
        let removed = self.inner.records.write().remove(id);
        self.flusher.schedule_flush();
        removed
    }

    /// Carry a record over a rename. Returns whether anything moved.
    pub fn rekey(&self, old_name: &str, new_name: &str, size: u64) -> bool {
        let old_id = FileIdentity::compute(old_name, size);
        let new_id = FileIdentity::compute(new_name, size);

        let moved = {
            let mut records = self.inner.records.write();
            match records.remove(&old_id) {
                Some(record) => {
                    records.insert(new_id, record);
                    true
                }
                None => false,
            }
        };

        if moved {
            debug!(%old_id, %new_id, "re-keyed metadata after rename");
            self.flusher.schedule_flush();
        }
        moved
    }

    /// Save now, bypassing the debounce windows.
    pub async fn flush_now(&self) {
        self.flusher.flush_now().await;
    }

    /// Final save; mutations afterwards stay in memory only.
    pub async fn shutdown(&self) {
        self.flusher.shutdown().await;
    }
}
