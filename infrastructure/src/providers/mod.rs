//! LLM provider adapters
//!
//! One [`ProviderAdapter`] per API family creates per-model clients;
//! [`routing::RoutingGateway`] picks the adapter for each model.

pub mod anthropic;
mod http;
pub mod openai_compat;
pub mod routing;

use async_trait::async_trait;
use navigator_application::{GatewayError, ModelClient};
use navigator_domain::{Model, ProviderKind};
use std::sync::Arc;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Create a client for `model`. Credentials are resolved here, so a
    /// missing key fails only the models routed to this provider.
    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError>;
}
