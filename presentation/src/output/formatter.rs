//! Output formatter trait

use navigator_domain::{EvaluationReport, OutputFormat};

/// Trait for formatting evaluation reports
pub trait OutputFormatter {
    /// Human-readable summary of every model and the consensus
    fn format_summary(&self, report: &EvaluationReport) -> String;

    /// The aggregate document as pretty-printed JSON
    fn format_json(&self, report: &EvaluationReport) -> String;

    fn render(&self, report: &EvaluationReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => self.format_summary(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
