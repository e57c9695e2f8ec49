//! Anthropic Messages API client.

use super::http::{parse_model_output, resolve_api_key, status_error, transport_error};
use super::ProviderAdapter;
use async_trait::async_trait;
use navigator_application::{GatewayError, ModelClient};
use navigator_domain::{AnthropicProviderConfig, Model, ProviderKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

pub struct AnthropicClient {
    http: Client,
    model: Model,
    api_key: String,
    config: AnthropicProviderConfig,
}

impl AnthropicClient {
    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Value, GatewayError> {
        let request = MessagesRequest {
            model: self.model.as_str(),
            max_tokens: self.config.max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!("{}: HTTP {} ({} bytes)", self.model, status, body.len());

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let message: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Parse(format!("unexpected response body: {}", e)))?;
        parse_model_output(&message.text())
    }
}

pub struct AnthropicAdapter {
    http: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicAdapter {
    pub fn new(http: Client, config: AnthropicProviderConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError> {
        let api_key = resolve_api_key(self.config.api_key.as_deref(), &self.config.api_key_env)?;
        Ok(Arc::new(AnthropicClient {
            http: self.http.clone(),
            model: model.clone(),
            api_key,
            config: self.config.clone(),
        }))
    }
}
