//! Profile data location from TOML (`[data]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDataConfig {
    /// Directory holding one `<profile>.json` aggregate per profile
    pub profile_dir: PathBuf,
}

impl Default for FileDataConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("data/profiles"),
        }
    }
}
