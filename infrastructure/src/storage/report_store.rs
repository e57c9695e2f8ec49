//! Evaluation document persisted as pretty-printed JSON.
//!
//! Saves go through a sibling temp file and a rename, so readers never see
//! a half-written document.

use navigator_application::{EvaluationRepository, RepositoryError};
use navigator_domain::EvaluationReport;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonReportStore {
    path: PathBuf,
}

impl JsonReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl EvaluationRepository for JsonReportStore {
    fn load(&self) -> Result<Option<EvaluationReport>, RepositoryError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RepositoryError::Malformed(e.to_string()))
    }

    fn save(&self, report: &EvaluationReport) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| RepositoryError::Malformed(e.to_string()))?;
        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(
            "Saved {} model evaluations to {}",
            report.models.len(),
            self.path.display()
        );
        Ok(())
    }
}
