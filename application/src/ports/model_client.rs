//! Model client port
//!
//! Defines the interface for calling an LLM provider. Each client is bound
//! to one model and normalizes its provider's request/response quirks
//! behind [`ModelClient::call`], which yields the parsed JSON object the
//! model returned.

use async_trait::async_trait;
use navigator_domain::{ChunkFailureKind, Model, SkipReason};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during a model call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response carried no usable JSON object
    #[error("Parse error: {0}")]
    Parse(String),

    /// Credentials missing or rejected. Fatal for the affected model only.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    /// No configured provider can serve the model
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl GatewayError {
    /// Chunk failure classification for this error
    pub fn failure_kind(&self) -> ChunkFailureKind {
        match self {
            GatewayError::Transport(_) | GatewayError::Timeout(_) => ChunkFailureKind::Transport,
            GatewayError::Parse(_) => ChunkFailureKind::Parse,
            GatewayError::Auth(_) => ChunkFailureKind::Auth,
            GatewayError::ModelNotAvailable(_) => ChunkFailureKind::ModelUnavailable,
        }
    }

    /// Errors that end the model's run instead of a single chunk
    pub fn abort_reason(&self) -> Option<SkipReason> {
        self.failure_kind().abort_reason()
    }
}

/// A client bound to one model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Get the model served by this client
    fn model(&self) -> &Model;

    /// Send one prompt and return the JSON object from the response
    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Value, GatewayError>;
}

/// Gateway resolving models to provider clients
///
/// This port defines how the application layer obtains model clients.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a client for the specified model
    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError>;
}
