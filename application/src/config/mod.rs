//! Application-level configuration.
//!
//! - [`EvaluationParams`]: run control (chunking, throttling, timeouts, prompt budgets)

pub mod evaluation_params;

pub use evaluation_params::EvaluationParams;
