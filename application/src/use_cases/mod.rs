//! Use cases (application services)

pub mod evaluate_model;
pub mod final_assessment;
pub mod plan;
pub mod retry_chunks;
pub mod run_chunks;
pub mod run_evaluation;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod testing;
