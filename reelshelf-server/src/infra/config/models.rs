use std::{path::PathBuf, time::Duration};

use reelshelf_core::FlushPolicy;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub metadata: MetadataConfig,
    pub ffprobe: FfprobeConfig,
    pub durations: DurationsConfig,
    pub sources: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Every request path is resolved below this directory
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub path: PathBuf,
    pub short_debounce: Duration,
    pub long_debounce: Duration,
}

impl MetadataConfig {
    pub fn flush_policy(&self) -> FlushPolicy {
        FlushPolicy {
            quiet_period: self.short_debounce,
            max_delay: self.long_debounce,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DurationsConfig {
    /// Concurrent probe processes, at least one
    pub concurrency: usize,
}

/// Where the configuration came from, for startup logging.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
