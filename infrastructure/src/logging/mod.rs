//! Logging infrastructure: structured call logging.
//!
//! Provides [`JsonlCallLogger`], a JSONL file writer that implements
//! the [`CallLogger`](navigator_application::CallLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlCallLogger;
