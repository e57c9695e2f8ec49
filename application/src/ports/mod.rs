//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod call_logger;
pub mod evaluation_repository;
pub mod model_client;
pub mod profile_data;
pub mod progress;
pub mod rate_limiter;
