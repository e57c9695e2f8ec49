//! Port for structured call logging.
//!
//! Defines the [`CallLogger`] trait for recording every remote model call
//! (model, chunk, prompt size, outcome) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the call
//! sequence in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured call event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter adds the timestamp.
pub struct CallEvent {
    /// Event type identifier (e.g., "chunk_call", "final_call").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl CallEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging call events to a structured log.
///
/// The `log` method is synchronous and non-fallible so that logging
/// failures never disturb an evaluation run.
pub trait CallLogger: Send + Sync {
    /// Record a call event.
    fn log(&self, event: CallEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoCallLogger;

impl CallLogger for NoCallLogger {
    fn log(&self, _event: CallEvent) {}
}
