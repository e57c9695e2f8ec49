use super::anthropic::AnthropicAdapter;
use super::openai_compat::OpenAiCompatibleAdapter;
use super::ProviderAdapter;
use async_trait::async_trait;
use navigator_application::{GatewayError, LlmGateway, ModelClient};
use navigator_domain::{Model, ProviderConfig, ProviderKind};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    /// Model id to provider kind, from `[providers.routing]`
    explicit_model_routing: HashMap<String, ProviderKind>,
    default_kind: Option<ProviderKind>,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>, config: &ProviderConfig) -> Self {
        Self {
            providers,
            explicit_model_routing: config.routing.clone(),
            default_kind: config.default,
        }
    }

    /// Gateway with the Anthropic, OpenAI and Gemini adapters sharing one HTTP client.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let http = Client::new();
        let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(AnthropicAdapter::new(http.clone(), config.anthropic.clone())),
            Arc::new(OpenAiCompatibleAdapter::new(
                ProviderKind::OpenAi,
                http.clone(),
                config.openai.clone(),
            )),
            Arc::new(OpenAiCompatibleAdapter::new(
                ProviderKind::Gemini,
                http,
                config.gemini.clone(),
            )),
        ];
        Self::new(providers, config)
    }

    /// Resolution order:
    ///  1. explicit routing entry for the model id
    ///  2. model family (claude, gpt/o-series, gemini)
    ///  3. the configured default provider
    fn resolve_kind(&self, model: &Model) -> Option<ProviderKind> {
        if let Some(kind) = self.explicit_model_routing.get(model.as_str()) {
            return Some(*kind);
        }
        if model.is_claude() {
            Some(ProviderKind::Anthropic)
        } else if model.is_gpt() {
            Some(ProviderKind::OpenAi)
        } else if model.is_gemini() {
            Some(ProviderKind::Gemini)
        } else {
            self.default_kind
        }
    }

    fn resolve_provider(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        let kind = self.resolve_kind(model).ok_or_else(|| {
            GatewayError::ModelNotAvailable(format!(
                "no provider for {}; add it to [providers.routing] or set providers.default",
                model
            ))
        })?;
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                GatewayError::ModelNotAvailable(format!("provider {} is not configured", kind))
            })
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError> {
        let provider = self.resolve_provider(model)?;
        debug!("Routing {} to {}", model, provider.kind());
        provider.create_client(model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    // -- Mock ProviderAdapter --------------------------------------------------

    struct MockProvider {
        kind: ProviderKind,
    }

    struct MockClient {
        model: Model,
    }

    #[async_trait]
    impl ModelClient for MockClient {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn call(&self, _prompt: &str, _system: &str) -> Result<Value, GatewayError> {
            Err(GatewayError::Transport("mock".into()))
        }
    }

    fn provider(kind: ProviderKind) -> Arc<dyn ProviderAdapter> {
        Arc::new(MockProvider { kind })
    }

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn create_client(
            &self,
            model: &Model,
        ) -> Result<Arc<dyn ModelClient>, GatewayError> {
            Ok(Arc::new(MockClient {
                model: model.clone(),
            }))
        }
    }

    fn all_providers() -> Vec<Arc<dyn ProviderAdapter>> {
        vec![
            provider(ProviderKind::Anthropic),
            provider(ProviderKind::OpenAi),
            provider(ProviderKind::Gemini),
        ]
    }

    fn kind_for(gateway: &RoutingGateway, id: &str) -> Option<ProviderKind> {
        gateway.resolve_kind(&id.parse().unwrap())
    }

    // -- Tests -----------------------------------------------------------------

    #[test]
    fn test_family_inference() {
        let gateway = RoutingGateway::new(all_providers(), &ProviderConfig::default());
        assert_eq!(kind_for(&gateway, "claude-sonnet-4-5"), Some(ProviderKind::Anthropic));
        assert_eq!(kind_for(&gateway, "gpt-5"), Some(ProviderKind::OpenAi));
        assert_eq!(kind_for(&gateway, "o4-mini"), Some(ProviderKind::OpenAi));
        assert_eq!(kind_for(&gateway, "gemini-2.5-pro"), Some(ProviderKind::Gemini));
        assert_eq!(kind_for(&gateway, "llama-4"), None);
    }

    #[test]
    fn test_explicit_routing_wins() {
        let mut config = ProviderConfig::default();
        config
            .routing
            .insert("gpt-5".to_string(), ProviderKind::Gemini);
        let gateway = RoutingGateway::new(all_providers(), &config);
        assert_eq!(kind_for(&gateway, "gpt-5"), Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_default_provider_for_unknown_family() {
        let config = ProviderConfig {
            default: Some(ProviderKind::OpenAi),
            ..Default::default()
        };
        let gateway = RoutingGateway::new(all_providers(), &config);
        assert_eq!(kind_for(&gateway, "llama-4"), Some(ProviderKind::OpenAi));
    }

    #[tokio::test]
    async fn test_unroutable_model_is_not_available() {
        let gateway = RoutingGateway::new(all_providers(), &ProviderConfig::default());
        let result = gateway.create_client(&"llama-4".parse().unwrap()).await;
        assert!(matches!(result, Err(GatewayError::ModelNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_missing_provider_is_not_available() {
        let gateway = RoutingGateway::new(
            vec![provider(ProviderKind::Anthropic)],
            &ProviderConfig::default(),
        );
        let result = gateway.create_client(&Model::Gpt5).await;
        assert!(matches!(result, Err(GatewayError::ModelNotAvailable(_))));

        let client = gateway.create_client(&Model::ClaudeHaiku45).await.unwrap();
        assert_eq!(client.model(), &Model::ClaudeHaiku45);
    }
}
