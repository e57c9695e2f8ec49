//! File-backed stores for profile data and the evaluation document.

mod profile_store;
mod report_store;

pub use profile_store::JsonProfileStore;
pub use report_store::JsonReportStore;
