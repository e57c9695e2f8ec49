//! Output configuration from TOML (`[output]` section)

use navigator_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use navigator_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Aggregate evaluation document
    pub path: PathBuf,
    /// Console output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// JSONL call log (disabled when unset)
    pub call_log: Option<PathBuf>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("navigator_evaluation.json"),
            format: None,
            call_log: None,
            color: true,
        }
    }
}
