//! Shared utilities for use cases.
//!
//! Contains the throttled model call and call-event logging used by both
//! the chunk runner and the final assessor.

use crate::ports::call_logger::{CallEvent, CallLogger};
use crate::ports::model_client::{GatewayError, ModelClient};
use crate::ports::rate_limiter::RateLimiter;
use serde_json::{Value, json};
use std::time::Duration;

/// Acquire the limiter, then send one prompt with an optional timeout.
///
/// Exactly one attempt is made; failures are returned to the caller.
pub(crate) async fn call_throttled(
    client: &dyn ModelClient,
    limiter: &dyn RateLimiter,
    timeout: Option<Duration>,
    prompt: &str,
    system_prompt: &str,
) -> Result<Value, GatewayError> {
    limiter.acquire().await;
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.call(prompt, system_prompt))
            .await
            .map_err(|_| GatewayError::Timeout(limit.as_secs()))?,
        None => client.call(prompt, system_prompt).await,
    }
}

/// Record one remote call to the structured call log.
///
/// `chunk` is `None` for the final-assessment call.
pub(crate) fn log_call(
    logger: &dyn CallLogger,
    model_id: &str,
    chunk: Option<usize>,
    prompt_bytes: usize,
    error: Option<String>,
) {
    let (event_type, chunk_field) = match chunk {
        Some(index) => ("chunk_call", json!(index)),
        None => ("final_call", json!("final")),
    };
    logger.log(CallEvent::new(
        event_type,
        json!({
            "model": model_id,
            "chunk": chunk_field,
            "prompt_bytes": prompt_bytes,
            "status": if error.is_none() { "ok" } else { "error" },
            "error": error,
        }),
    ));
}
