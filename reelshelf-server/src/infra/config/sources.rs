use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub media: FileMediaConfig,
    #[serde(default)]
    pub metadata: FileMetadataConfig,
    #[serde(default)]
    pub ffprobe: FileFfprobeConfig,
    #[serde(default)]
    pub durations: FileDurationsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMediaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Debounce windows are written in humantime syntax (`"4s"`, `"1m 30s"`).
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMetadataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_debounce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_debounce: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileFfprobeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDurationsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub media_root: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
    pub metadata_short_debounce: Option<String>,
    pub metadata_long_debounce: Option<String>,
    pub ffprobe_path: Option<PathBuf>,
    pub duration_concurrency: Option<usize>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("REELSHELF_CONFIG")
                .ok()
                .map(PathBuf::from),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            media_root: std::env::var("MEDIA_ROOT").ok().map(PathBuf::from),
            metadata_path: std::env::var("METADATA_PATH")
                .ok()
                .map(PathBuf::from),
            metadata_short_debounce: std::env::var("METADATA_SHORT_DEBOUNCE")
                .ok(),
            metadata_long_debounce: std::env::var("METADATA_LONG_DEBOUNCE").ok(),
            ffprobe_path: std::env::var("FFPROBE_PATH").ok().map(PathBuf::from),
            duration_concurrency: std::env::var("DURATION_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
