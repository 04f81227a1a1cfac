use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use super::{
    models::{
        Config, ConfigMetadata, DurationsConfig, FfprobeConfig, MediaConfig,
        MetadataConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("reelshelf.toml"),
        PathBuf::from("config/reelshelf.toml"),
    ]
});

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SHORT_DEBOUNCE: Duration = Duration::from_secs(4);
const DEFAULT_LONG_DEBOUNCE: Duration = Duration::from_secs(10);

/// Resolves a [`Config`] from an optional `.env` file, the process
/// environment, an optional TOML file and built-in defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid duration for {key}: {value:?}")]
    InvalidDuration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let mut warnings = ConfigWarnings::default();
        if config_path.is_none() {
            warnings.push_with_hint(
                "No reelshelf.toml detected; using environment and defaults",
                "Create reelshelf.toml or pass --config to pin settings",
            );
        }

        let config = compose_config(
            file_config.unwrap_or_default(),
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
            &mut warnings,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) =
            match self.config_path.as_ref().or(env.config_path.as_ref())
            {
                Some(path) => (path.clone(), true),
                None => match DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                {
                    Some(path) => (path.clone(), false),
                    None => return Ok((None, None)),
                },
            };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Environment wins over the file, the file wins over defaults.
fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    sources: ConfigMetadata,
    warnings: &mut ConfigWarnings,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        media: file_media,
        metadata: file_metadata,
        ffprobe: file_ffprobe,
        durations: file_durations,
    } = file;

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let media = MediaConfig {
        root: env
            .media_root
            .or(file_media.root)
            .unwrap_or_else(|| PathBuf::from("./data")),
    };

    let short_debounce = resolve_duration(
        "metadata.short_debounce",
        env.metadata_short_debounce.or(file_metadata.short_debounce),
        DEFAULT_SHORT_DEBOUNCE,
    )?;
    let long_debounce = resolve_duration(
        "metadata.long_debounce",
        env.metadata_long_debounce.or(file_metadata.long_debounce),
        DEFAULT_LONG_DEBOUNCE,
    )?;
    if long_debounce < short_debounce {
        warnings.push(format!(
            "metadata.long_debounce ({}) is shorter than metadata.short_debounce ({}); \
             saves will happen on the long window",
            humantime::format_duration(long_debounce),
            humantime::format_duration(short_debounce),
        ));
    }
    let metadata = MetadataConfig {
        path: env
            .metadata_path
            .or(file_metadata.path)
            .unwrap_or_else(|| PathBuf::from("./metadata/fileinfos.txt")),
        short_debounce,
        long_debounce,
    };

    let ffprobe = FfprobeConfig {
        path: env
            .ffprobe_path
            .or(file_ffprobe.path)
            .unwrap_or_else(|| PathBuf::from("ffprobe")),
    };

    let requested = env
        .duration_concurrency
        .or(file_durations.concurrency)
        .unwrap_or(reelshelf_core::DEFAULT_PROBE_CONCURRENCY);
    if requested == 0 {
        warnings.push("durations.concurrency must be at least 1; using 1");
    }
    let durations = DurationsConfig {
        concurrency: requested.max(1),
    };

    Ok(Config {
        server,
        media,
        metadata,
        ffprobe,
        durations,
        sources,
    })
}

fn resolve_duration(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        None => Ok(default),
        Some(value) => humantime::parse_duration(value.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration { key, value, source }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_file(contents: &str, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelshelf.toml");
        fs::write(&path, contents).unwrap();
        ConfigLoader::new()
            .with_config_path(&path)
            .load_with_env(env, false)
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let mut warnings = ConfigWarnings::default();
        let config = compose_config(
            FileConfig::default(),
            EnvConfig::default(),
            ConfigMetadata::default(),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.media.root, PathBuf::from("./data"));
        assert_eq!(
            config.metadata.path,
            PathBuf::from("./metadata/fileinfos.txt")
        );
        assert_eq!(config.metadata.short_debounce, Duration::from_secs(4));
        assert_eq!(config.metadata.long_debounce, Duration::from_secs(10));
        assert_eq!(config.ffprobe.path, PathBuf::from("ffprobe"));
        assert_eq!(config.durations.concurrency, 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn file_values_are_read() {
        let load = load_file(
            r#"
            [server]
            port = 8080

            [media]
            root = "/srv/media"

            [metadata]
            short_debounce = "500ms"
            long_debounce = "1m"

            [durations]
            concurrency = 4
            "#,
            EnvConfig::default(),
        )
        .unwrap();

        let config = load.config;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.media.root, PathBuf::from("/srv/media"));
        assert_eq!(config.metadata.short_debounce, Duration::from_millis(500));
        assert_eq!(config.metadata.long_debounce, Duration::from_secs(60));
        assert_eq!(config.durations.concurrency, 4);
        assert!(config.sources.config_path.is_some());
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn environment_overrides_file() {
        let env = EnvConfig {
            server_port: Some(9000),
            media_root: Some(PathBuf::from("/env/media")),
            metadata_short_debounce: Some("2s".into()),
            ..EnvConfig::default()
        };
        let config = load_file(
            "[server]\nport = 8080\n[media]\nroot = \"/file/media\"\n",
            env,
        )
        .unwrap()
        .config;

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.media.root, PathBuf::from("/env/media"));
        assert_eq!(config.metadata.short_debounce, Duration::from_secs(2));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new()
            .with_config_path(dir.path().join("absent.toml"))
            .load_with_env(EnvConfig::default(), false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }

    #[test]
    fn bad_duration_is_reported_with_its_key() {
        let err = load_file(
            "[metadata]\nshort_debounce = \"soon\"\n",
            EnvConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidDuration {
                key: "metadata.short_debounce",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = load_file("[server\nport = ", EnvConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn zero_concurrency_is_clamped_with_a_warning() {
        let load = load_file(
            "[durations]\nconcurrency = 0\n[metadata]\nshort_debounce = \"20s\"\n",
            EnvConfig::default(),
        )
        .unwrap();
        assert_eq!(load.config.durations.concurrency, 1);
        // Clamped concurrency plus the inverted debounce windows
        assert_eq!(load.warnings.items.len(), 2);
    }
}
