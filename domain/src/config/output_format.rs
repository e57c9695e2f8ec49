//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-model summary with consensus (default)
    #[default]
    Summary,
    /// The aggregate JSON document
    Json,
}
