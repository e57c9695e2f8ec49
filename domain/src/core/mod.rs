//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: LLMs that can act as navigators
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
