//! Console output formatter for evaluation reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use navigator_domain::{
    ConsensusReport, EvaluationReport, ModelEvaluation, PipelineState, ProfileId,
};
use std::collections::BTreeMap;

/// Formats evaluation reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the per-model summary and the consensus
    pub fn format(report: &EvaluationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Navigator Evaluation"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Generated:".cyan().bold(),
            report.generated_at
        ));
        output.push_str(&format!(
            "{} {} questions in chunks of {}\n",
            "Settings:".cyan().bold(),
            report.settings.question_count,
            report.settings.chunk_size
        ));

        output.push_str(&Self::section_header("Models"));
        if report.models.is_empty() {
            output.push_str(&format!("\n{}\n", "No models evaluated".dimmed()));
        }
        for evaluation in report.models.values().filter(|e| !e.is_skipped()) {
            output.push_str(&Self::format_model(evaluation));
        }

        if !report.skipped.is_empty() {
            output.push_str(&Self::section_header("Skipped"));
            for skipped in &report.skipped {
                output.push_str(&format!(
                    "  {} {} ({})\n",
                    "x".red(),
                    skipped.model_id.bold(),
                    skipped.reason
                ));
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::format_consensus(&report.consensus));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &EvaluationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_model(evaluation: &ModelEvaluation) -> String {
        let mut output = String::new();

        let title = format!("── {} ──", evaluation.model_id);
        let title = if evaluation.state == PipelineState::Done {
            title.yellow().bold()
        } else {
            title.red().bold()
        };
        output.push_str(&format!("\n{}\n", title));

        if let Some(merged) = &evaluation.merged {
            output.push_str(&format!(
                "  {} {}\n",
                "Totals:".bold(),
                Self::profile_row(&merged.profile_totals)
            ));
            output.push_str(&format!(
                "  {} {}\n",
                "Won:".bold(),
                Self::profile_row(&merged.questions_won())
            ));
            output.push_str(&format!(
                "  {} {}\n",
                "Scored:".bold(),
                merged.questions_scored()
            ));
            if merged.chunk_errors {
                let failed: Vec<String> = merged.failed_chunks.iter().map(|c| c.to_string()).collect();
                output.push_str(&format!(
                    "  {} chunks {} failed\n",
                    "degraded:".yellow().bold(),
                    failed.join(", ")
                ));
            }
        }

        match &evaluation.final_assessment {
            Some(assessment) => {
                let recommendation = &assessment.recommendation;
                output.push_str(&format!(
                    "  {} {} ({} confidence)",
                    "Recommendation:".green().bold(),
                    recommendation.best_for_production.to_string().bold(),
                    recommendation.confidence
                ));
                if assessment.is_fallback() {
                    output.push_str(&format!(" {}", "[fallback]".yellow()));
                }
                output.push('\n');
                if let Some(reason) = &assessment.fallback_reason {
                    output.push_str(&format!("  {} {}\n", "Fallback:".dimmed(), reason));
                } else if !recommendation.reasoning.is_empty() {
                    output.push_str(&format!("  {}\n", Self::indent(&recommendation.reasoning, "  ")));
                }
            }
            None => {
                output.push_str(&format!("  {} {}\n", "State:".bold(), evaluation.state));
            }
        }

        output
    }

    fn format_consensus(consensus: &ConsensusReport) -> String {
        if consensus.models_counted == 0 {
            return format!("\n{}\n", "No completed models, no consensus".dimmed());
        }

        let mut output = String::new();
        output.push('\n');
        for profile in ProfileId::ALL {
            let votes = consensus.votes.get(&profile).copied().unwrap_or(0);
            let line = format!("  {:<12} {}", profile.as_str(), votes);
            if consensus.winner == Some(profile) {
                output.push_str(&format!("{}\n", line.green().bold()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        output.push_str(&format!(
            "\n{} {:.0}% of {} models\n",
            "Agreement:".cyan().bold(),
            consensus.agreement_ratio * 100.0,
            consensus.models_counted
        ));
        match consensus.winner {
            Some(winner) => output.push_str(&format!(
                "{} {}\n",
                "Winner:".cyan().bold(),
                winner.as_str().green().bold()
            )),
            None => output.push_str(&format!("{} {}\n", "Winner:".cyan().bold(), "tie".yellow())),
        }

        output
    }

    fn profile_row(values: &BTreeMap<ProfileId, u32>) -> String {
        ProfileId::ALL
            .iter()
            .map(|p| format!("{}={}", p, values.get(p).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_summary(&self, report: &EvaluationReport) -> String {
        ConsoleFormatter::format(report)
    }

    fn format_json(&self, report: &EvaluationReport) -> String {
        ConsoleFormatter::format_json(report)
    }
}
