pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{
    ConfigLoad, ConfigLoadError, ConfigLoader, ConfigWarning, ConfigWarnings,
};
pub use models::{
    Config, ConfigMetadata, DurationsConfig, FfprobeConfig, MediaConfig,
    MetadataConfig, ServerConfig,
};
