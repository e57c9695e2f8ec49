//! Profile keyword data read from `<profile_dir>/<profile>.json`.
//!
//! ```json
//! { "document_count": 42, "keywords": [{ "term": "raft", "frequency": 17 }] }
//! ```

use navigator_application::{ProfileDataError, ProfileDataSource};
use navigator_domain::{KeywordEntry, ProfileId, ProfileSummary};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    document_count: u32,
    keywords: Vec<KeywordEntry>,
}

pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, profile: ProfileId) -> PathBuf {
        self.dir.join(format!("{}.json", profile))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ProfileDataSource for JsonProfileStore {
    fn load(&self, profile: ProfileId) -> Result<ProfileSummary, ProfileDataError> {
        let path = self.path_for(profile);
        let content = std::fs::read_to_string(&path).map_err(|_| ProfileDataError::NotFound {
            profile,
            location: path.display().to_string(),
        })?;
        let file: ProfileFile =
            serde_json::from_str(&content).map_err(|e| ProfileDataError::Invalid {
                profile,
                message: e.to_string(),
            })?;

        debug!(
            "Loaded {} keywords for {} from {}",
            file.keywords.len(),
            profile,
            path.display()
        );
        Ok(ProfileSummary {
            profile,
            document_count: file.document_count,
            keywords: file.keywords,
        })
    }
}
