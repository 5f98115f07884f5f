//! Configuration file loading for deepdive
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DEEPDIVE_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./deepdive.toml` or `./.deepdive.toml`
//! 4. Global: `$XDG_CONFIG_HOME/deepdive/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileModelEntry, FileProviderEndpoint, FileProvidersConfig, FileResearchConfig,
    FileRetryConfig, FileRouterConfig, FileSourcesConfig,
};
pub use loader::ConfigLoader;
