//! Output formatting for evaluation reports

pub mod console;
pub mod formatter;
