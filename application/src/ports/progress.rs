//! Progress notification port
//!
//! Defines the interface for reporting progress during an evaluation run.

use navigator_domain::{Model, PipelineState};

/// Callback for progress updates during an evaluation run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a model's pipeline starts; `total_calls` counts chunk calls plus the final call
    fn on_model_start(&self, model: &Model, total_calls: usize);

    /// Called after each attempted chunk
    fn on_chunk_complete(&self, model: &Model, chunk_index: usize, success: bool);

    /// Called after the final-assessment step
    fn on_final_complete(&self, _model: &Model, _fallback: bool) {}

    /// Called when the model reaches a terminal state
    fn on_model_complete(&self, model: &Model, state: PipelineState);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_model_start(&self, _model: &Model, _total_calls: usize) {}
    fn on_chunk_complete(&self, _model: &Model, _chunk_index: usize, _success: bool) {}
    fn on_model_complete(&self, _model: &Model, _state: PipelineState) {}
}
