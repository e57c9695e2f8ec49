//! Chat-completions client (OpenAI and Gemini's OpenAI-compatible endpoint).

use super::http::{parse_model_output, resolve_api_key, status_error, transport_error};
use super::ProviderAdapter;
use async_trait::async_trait;
use navigator_application::{GatewayError, ModelClient};
use navigator_domain::{Model, OpenAiCompatibleConfig, ProviderKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Sampling temperature for models that accept one.
const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the request body, applying the reasoning-model parameter rules.
fn build_request<'a>(
    model: &'a Model,
    max_tokens: u32,
    prompt: &'a str,
    system_prompt: &'a str,
) -> ChatCompletionRequest<'a> {
    let reasoning = model.is_openai_reasoning();
    ChatCompletionRequest {
        model: model.as_str(),
        messages: vec![
            Message {
                role: "system",
                content: system_prompt,
            },
            Message {
                role: "user",
                content: prompt,
            },
        ],
        max_tokens: (!reasoning).then_some(max_tokens),
        max_completion_tokens: reasoning.then_some(max_tokens),
        temperature: (!reasoning).then_some(TEMPERATURE),
    }
}

pub struct OpenAiCompatibleClient {
    http: Client,
    model: Model,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Value, GatewayError> {
        let request = build_request(&self.model, self.max_tokens, prompt, system_prompt);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
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

        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Parse(format!("unexpected response body: {}", e)))?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::Parse("response has no message content".into()))?;

        parse_model_output(&text)
    }
}

/// Provider adapter for one chat-completions endpoint
pub struct OpenAiCompatibleAdapter {
    kind: ProviderKind,
    http: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleAdapter {
    pub fn new(kind: ProviderKind, http: Client, config: OpenAiCompatibleConfig) -> Self {
        Self { kind, http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError> {
        let api_key = resolve_api_key(self.config.api_key.as_deref(), &self.config.api_key_env)?;
        Ok(Arc::new(OpenAiCompatibleClient {
            http: self.http.clone(),
            model: model.clone(),
            api_key,
            endpoint: self.endpoint(),
            max_tokens: self.config.max_tokens,
        }))
    }
}
