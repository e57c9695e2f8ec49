//! Profile data port
//!
//! Source of the per-profile aggregate keyword data the navigators search.

use navigator_domain::{ProfileId, ProfileSummary};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileDataError {
    #[error("No data for profile {profile} at {location}")]
    NotFound { profile: ProfileId, location: String },

    #[error("Invalid data for profile {profile}: {message}")]
    Invalid { profile: ProfileId, message: String },
}

/// Loads one aggregate keyword summary per profile
pub trait ProfileDataSource: Send + Sync {
    fn load(&self, profile: ProfileId) -> Result<ProfileSummary, ProfileDataError>;
}
