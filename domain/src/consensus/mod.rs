//! Cross-model consensus
//!
//! Each model that completes its pipeline casts one vote: its recommended
//! profile. Skipped models do not vote and do not count toward the
//! agreement denominator.

pub mod aggregator;

pub use aggregator::{ConsensusReport, CrossModelAggregator};
