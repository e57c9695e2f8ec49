//! Progress reporting for evaluation runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use navigator_application::ports::progress::ProgressNotifier;
use navigator_domain::{Model, PipelineState};
use std::sync::Mutex;

/// Reports progress with one bar per model
pub struct ProgressReporter {
    multi: MultiProgress,
    model_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            model_bar: Mutex::new(None),
        }
    }

    fn model_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.model_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn state_label(state: PipelineState) -> colored::ColoredString {
    match state {
        PipelineState::Done => "done".green(),
        PipelineState::Skipped => "skipped".yellow(),
        other => other.as_str().to_lowercase().red(),
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_model_start(&self, model: &Model, total_calls: usize) {
        let pb = self.multi.add(ProgressBar::new(total_calls as u64));
        pb.set_style(Self::model_style());
        pb.set_prefix(model.to_string());
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.model_bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_chunk_complete(&self, _model: &Model, chunk_index: usize, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} chunk {}", "v".green(), chunk_index)
            } else {
                format!("{} chunk {}", "x".red(), chunk_index)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_final_complete(&self, _model: &Model, fallback: bool) {
        self.with_bar(|pb| {
            let status = if fallback {
                format!("{} final (fallback)", "~".yellow())
            } else {
                format!("{} final", "v".green())
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_model_complete(&self, _model: &Model, state: PipelineState) {
        let taken = self.model_bar.lock().ok().and_then(|mut guard| guard.take());
        if let Some(pb) = taken {
            pb.finish_with_message(format!("{}", state_label(state)));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_model_start(&self, model: &Model, total_calls: usize) {
        println!(
            "{} {} ({} calls)",
            "->".cyan(),
            model.to_string().bold(),
            total_calls
        );
    }

    fn on_chunk_complete(&self, _model: &Model, chunk_index: usize, success: bool) {
        if success {
            println!("  {} chunk {}", "v".green(), chunk_index);
        } else {
            println!("  {} chunk {} (failed)", "x".red(), chunk_index);
        }
    }

    fn on_final_complete(&self, _model: &Model, fallback: bool) {
        if fallback {
            println!("  {} final assessment (fallback)", "~".yellow());
        } else {
            println!("  {} final assessment", "v".green());
        }
    }

    fn on_model_complete(&self, model: &Model, state: PipelineState) {
        println!("  {} {}", model, state_label(state));
        println!();
    }
}
