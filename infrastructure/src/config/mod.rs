//! Configuration file loading for keyword-navigator
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `NAVIGATOR_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./navigator.toml` or `./.navigator.toml`
//! 4. Global: `<config_dir>/keyword-navigator/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnthropicConfig, FileConfig, FileDataConfig, FileEvaluationConfig,
    FileOpenAiConfig, FileOutputConfig, FileOutputFormat, FileProvidersConfig,
};
pub use loader::ConfigLoader;
