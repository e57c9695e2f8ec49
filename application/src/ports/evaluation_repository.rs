//! Evaluation repository port
//!
//! Persistence of the aggregate evaluation document. Saving happens after
//! every model, so an interrupted run keeps all finished models.

use navigator_domain::EvaluationReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("I/O error for '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Malformed evaluation document: {0}")]
    Malformed(String),
}

pub trait EvaluationRepository: Send + Sync {
    /// Load the persisted document, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<EvaluationReport>, RepositoryError>;

    /// Replace the persisted document
    fn save(&self, report: &EvaluationReport) -> Result<(), RepositoryError>;
}
