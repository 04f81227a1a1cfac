//! Directory queries over a media root.
//!
//! [`MediaLibrary`] ties the listing capability, the matcher, the metadata
//! store and the duration pipeline together. All request paths are relative
//! to the media root and may not climb out of it.

use std::{
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use reelshelf_model::{
    DirectoryListing, DurationsResponse, FilterRequest, FolderEntry,
    MediaEntry, MetadataRecord,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    durations::DurationResolver,
    error::{MediaError, Result},
    filter::{CompiledFilter, MAX_FOLDER_DEPTH},
    identity::FileIdentity,
    listing::{DirectoryLister, FsDirectoryLister, ListedEntry},
    media_type::is_media_file,
    metadata::MetadataStore,
    probe::DurationProbe,
};

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
    lister: Arc<dyn DirectoryLister>,
    store: Arc<MetadataStore>,
    durations: DurationResolver,
}

impl MediaLibrary {
    pub fn new(
        root: impl Into<PathBuf>,
        store: Arc<MetadataStore>,
        probe: Arc<dyn DurationProbe>,
        probe_concurrency: usize,
    ) -> Self {
        Self::with_lister(
            root,
            Arc::new(FsDirectoryLister),
            store,
            probe,
            probe_concurrency,
        )
    }

    pub fn with_lister(
        root: impl Into<PathBuf>,
        lister: Arc<dyn DirectoryLister>,
        store: Arc<MetadataStore>,
        probe: Arc<dyn DurationProbe>,
        probe_concurrency: usize,
    ) -> Self {
        let durations =
            DurationResolver::new(store.clone(), probe, probe_concurrency);
        Self {
            root: root.into(),
            lister,
            store,
            durations,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Join a request path onto the media root.
    ///
    /// Absolute paths and `..` components are rejected. An empty path is the
    /// root itself.
    pub fn resolve_path(&self, relative: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(MediaError::InvalidPath(relative.to_string()));
                }
            }
        }
        Ok(resolved)
    }

    /// List media files and folders under `relative`.
    ///
    /// The filter (if any) is applied before entries are enriched with
    /// cached metadata. Durations are only included when already cached.
    #[instrument(skip(self, filter), fields(filtered = filter.is_some()))]
    pub async fn query_directory(
        &self,
        relative: &str,
        filter: Option<&FilterRequest>,
    ) -> Result<DirectoryListing> {
        let filter = filter.map(CompiledFilter::new).transpose()?;
        let dir = self.resolve_path(relative)?;
        let lister = self.lister.clone();
        let store = self.store.clone();

        let listing = tokio::task::spawn_blocking(move || {
            build_listing(lister.as_ref(), &store, &dir, filter.as_ref())
        })
        .await
        .map_err(|err| MediaError::Internal(format!("listing task failed: {err}")))??;

        debug!(
            folders = listing.folder_infos.len(),
            media = listing.media_infos.len(),
            "directory listed"
        );
        Ok(listing)
    }

    /// Probe durations for every media file directly under `relative`.
    #[instrument(skip(self))]
    pub async fn compute_durations_for_directory(
        &self,
        relative: &str,
    ) -> Result<DurationsResponse> {
        let dir = self.resolve_path(relative)?;
        let lister = self.lister.clone();
        let listed_dir = dir.clone();

        let entries =
            tokio::task::spawn_blocking(move || list_existing(lister.as_ref(), &listed_dir))
                .await
                .map_err(|err| {
                    MediaError::Internal(format!("listing task failed: {err}"))
                })??;

        let names: Vec<String> = entries
            .into_iter()
            .filter(|entry| !entry.is_dir && is_media_file(&entry.name))
            .map(|entry| entry.name)
            .collect();
        let requested = names.len();

        let media_durations = self.durations.resolve_durations(&dir, names).await;
        info!(
            requested,
            resolved = media_durations.len(),
            "directory durations computed"
        );

        Ok(DurationsResponse {
            path: relative.to_string(),
            media_durations,
        })
    }

    /// Single file details, probing the duration if it is not cached yet.
    #[instrument(skip(self))]
    pub async fn media_info(&self, relative: &str) -> Result<MediaEntry> {
        let (path, name) = self.media_path(relative)?;
        let metadata = stat_file(&path).await?;
        let size = metadata.len();

        let duration = self.durations.resolve_single_duration(&path).await;
        let record = self
            .store
            .get_record(&FileIdentity::compute(&name, size))
            .unwrap_or_default();

        Ok(MediaEntry {
            file_name: name,
            file_size: size,
            modify_date: metadata.modified().ok().map(Into::into),
            duration,
            progress: record.progress,
        })
    }

    /// Record watch progress for the media file at `relative`.
    #[instrument(skip(self))]
    pub async fn update_progress(&self, relative: &str, progress: f64) -> Result<()> {
        let (path, name) = self.media_path(relative)?;
        if !(0.0..=1.0).contains(&progress) {
            return Err(MediaError::InvalidProgress(progress));
        }

        let size = stat_file(&path).await?.len();
        self.store
            .set_progress(FileIdentity::compute(&name, size), progress as f32);
        Ok(())
    }

    pub fn record_progress(&self, id: FileIdentity, progress: f32) -> Result<()> {
        if progress.is_nan() {
            return Err(MediaError::InvalidProgress(f64::from(progress)));
        }
        self.store.set_progress(id, progress);
        Ok(())
    }

    pub fn record_duration(&self, id: FileIdentity, seconds: u32) {
        self.store.set_duration(id, seconds);
    }

    /// For files deleted by the file management layer.
    pub fn forget(&self, id: &FileIdentity) -> Option<MetadataRecord> {
        self.store.remove(id)
    }

    /// For files renamed by the file management layer.
    pub fn rekey(&self, old_name: &str, new_name: &str, size: u64) -> bool {
        self.store.rekey(old_name, new_name, size)
    }

    /// Flush pending metadata and stop the background writer.
    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }

    fn media_path(&self, relative: &str) -> Result<(PathBuf, String)> {
        let path = self.resolve_path(relative)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_media_file(&name) {
            return Err(MediaError::NotMedia(relative.to_string()));
        }
        Ok((path, name))
    }
}

async fn stat_file(path: &Path) -> Result<std::fs::Metadata> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(metadata),
        Ok(_) => Err(MediaError::NotFound(path.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(MediaError::NotFound(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

fn list_existing(lister: &dyn DirectoryLister, dir: &Path) -> Result<Vec<ListedEntry>> {
    lister.list(dir).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            MediaError::NotFound(dir.to_path_buf())
        }
        _ => MediaError::Io(err),
    })
}

fn build_listing(
    lister: &dyn DirectoryLister,
    store: &MetadataStore,
    dir: &Path,
    filter: Option<&CompiledFilter>,
) -> Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();

    for entry in list_existing(lister, dir)? {
        if let Some(filter) = filter
            && !filter.passes(&entry, lister)
        {
            continue;
        }

        if entry.is_dir {
            let mut ancestors = vec![lister.canonical(dir)];
            let (media_file_count, media_disk_size) =
                media_totals(lister, &entry.path, &mut ancestors);
            listing.folder_infos.push(FolderEntry {
                folder_name: entry.name,
                media_file_count,
                media_disk_size,
                modify_date: entry.modified,
            });
        } else if is_media_file(&entry.name) {
            let record = store
                .get_record(&FileIdentity::compute(&entry.name, entry.size))
                .unwrap_or_default();
            listing.media_infos.push(MediaEntry {
                file_name: entry.name,
                file_size: entry.size,
                modify_date: entry.modified,
                duration: record.duration_seconds,
                progress: record.progress,
            });
        }
    }

    listing
        .folder_infos
        .sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    listing
        .media_infos
        .sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(listing)
}

/// Recursive `(count, bytes)` of media files below `dir`.
///
/// Folders already on the walk are skipped so linked cycles count once.
fn media_totals(
    lister: &dyn DirectoryLister,
    dir: &Path,
    ancestors: &mut Vec<PathBuf>,
) -> (u64, u64) {
    if ancestors.len() > MAX_FOLDER_DEPTH {
        return (0, 0);
    }
    let key = lister.canonical(dir);
    if ancestors.contains(&key) {
        debug!(path = %dir.display(), "folder already counted on this walk");
        return (0, 0);
    }

    let entries = match lister.list(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), "cannot summarize folder: {err}");
            return (0, 0);
        }
    };

    ancestors.push(key);
    let totals = entries.iter().fold((0, 0), |(count, bytes), entry| {
        if entry.is_dir {
            let (sub_count, sub_bytes) = media_totals(lister, &entry.path, &mut *ancestors);
            (count + sub_count, bytes + sub_bytes)
        } else if is_media_file(&entry.name) {
            (count + 1, bytes + entry.size)
        } else {
            (count, bytes)
        }
    });
    ancestors.pop();
    totals
}
