//! Cache-first duration resolution with a bounded number of probes in flight.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use reelshelf_model::MediaDuration;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, warn};

use crate::{
    identity::FileIdentity,
    media_type::is_media_file,
    metadata::MetadataStore,
    probe::{DurationProbe, round_duration},
};

/// Default number of concurrent probe processes.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 2;

#[derive(Debug, Clone)]
pub struct DurationResolver {
    store: Arc<MetadataStore>,
    probe: Arc<dyn DurationProbe>,
    permits: Arc<Semaphore>,
}

impl DurationResolver {
    /// `concurrency` is clamped to at least one. The limit is shared by every
    /// batch running through this resolver (and its clones).
    pub fn new(
        store: Arc<MetadataStore>,
        probe: Arc<dyn DurationProbe>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            probe,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Resolve durations for `names` inside `dir`.
    ///
    /// Cached durations are returned without probing. Each uncached file is
    /// probed at most twice; files that still fail are left out. Results are
    /// in completion order.
    pub async fn resolve_durations(
        &self,
        dir: &Path,
        names: Vec<String>,
    ) -> Vec<MediaDuration> {
        let mut tasks = JoinSet::new();
        for name in names {
            let resolver = self.clone();
            let path = dir.join(&name);
            tasks.spawn(async move { resolver.resolve_bounded(name, path).await });
        }

        let mut durations = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(duration)) => durations.push(duration),
                Ok(None) => {}
                Err(err) => warn!("duration task failed: {err}"),
            }
        }
        durations
    }

    async fn resolve_bounded(
        self,
        name: String,
        path: PathBuf,
    ) -> Option<MediaDuration> {
        let id = self.identify(&name, &path).await?;
        if let Some(duration) = self.store.cached_duration(&id) {
            debug!(file = %name, duration, "duration cache hit");
            return Some(MediaDuration {
                file_name: name,
                duration,
            });
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return None,
        };

        let duration = match self.probe_seconds(&path).await {
            Some(seconds) => seconds,
            None => {
                debug!(file = %name, "retrying duration probe");
                match self.probe_seconds(&path).await {
                    Some(seconds) => seconds,
                    None => {
                        warn!(
                            path = %path.display(),
                            "could not determine duration; omitting file"
                        );
                        return None;
                    }
                }
            }
        };

        self.store.set_duration(id, duration);
        Some(MediaDuration {
            file_name: name,
            duration,
        })
    }

    /// Same cache-check, probe and store sequence for one file, outside the
    /// concurrency limit and without a retry.
    pub async fn resolve_single_duration(&self, path: &Path) -> Option<u32> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        if !is_media_file(&name) {
            return None;
        }

        let id = self.identify(&name, path).await?;
        if let Some(duration) = self.store.cached_duration(&id) {
            return Some(duration);
        }

        let duration = self.probe_seconds(path).await?;
        self.store.set_duration(id, duration);
        Some(duration)
    }

    async fn identify(&self, name: &str, path: &Path) -> Option<FileIdentity> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Some(FileIdentity::compute(name, metadata.len())),
            Err(err) => {
                warn!(path = %path.display(), "cannot stat media file: {err}");
                None
            }
        }
    }

    async fn probe_seconds(&self, path: &Path) -> Option<u32> {
        match self.probe.probe(path).await {
            Ok(seconds) => {
                let rounded = round_duration(seconds);
                if rounded.is_none() {
                    debug!(path = %path.display(), seconds, "duration out of range");
                }
                rounded
            }
            Err(err) => {
                debug!(path = %path.display(), "duration probe failed: {err}");
                None
            }
        }
    }
}
