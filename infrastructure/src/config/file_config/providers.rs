//! Provider configuration from TOML (`[providers]` section)

use super::ConfigValidationError;
use navigator_domain::{
    AnthropicProviderConfig, OpenAiCompatibleConfig, ProviderConfig, ProviderKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the environment variable).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Max tokens per response.
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        let defaults = AnthropicProviderConfig::default();
        Self {
            api_key_env: defaults.api_key_env,
            api_key: defaults.api_key,
            base_url: defaults.base_url,
            max_tokens: defaults.max_tokens,
            api_version: defaults.api_version,
        }
    }
}

impl From<&FileAnthropicConfig> for AnthropicProviderConfig {
    fn from(file: &FileAnthropicConfig) -> Self {
        Self {
            api_key_env: file.api_key_env.clone(),
            api_key: file.api_key.clone(),
            base_url: file.base_url.clone(),
            max_tokens: file.max_tokens,
            api_version: file.api_version.clone(),
        }
    }
}

/// Chat-completions provider configuration (`[providers.openai]`, `[providers.gemini]`).
///
/// Unset fields fall back to the defaults of the provider the table belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
}

impl FileOpenAiConfig {
    fn resolve(&self, defaults: OpenAiCompatibleConfig) -> OpenAiCompatibleConfig {
        OpenAiCompatibleConfig {
            api_key_env: self.api_key_env.clone().unwrap_or(defaults.api_key_env),
            api_key: self.api_key.clone().or(defaults.api_key),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider for models no routing entry or family covers: "anthropic", "openai", "gemini".
    pub default: Option<String>,
    /// Explicit model → provider routing overrides.
    pub routing: HashMap<String, String>,
    pub anthropic: FileAnthropicConfig,
    pub openai: FileOpenAiConfig,
    pub gemini: FileOpenAiConfig,
}

impl FileProvidersConfig {
    pub fn to_provider_config(&self) -> Result<ProviderConfig, ConfigValidationError> {
        let parse = |field: String, value: &str| {
            value
                .parse::<ProviderKind>()
                .map_err(|_| ConfigValidationError::UnknownProvider {
                    field,
                    value: value.to_string(),
                })
        };

        let default = self
            .default
            .as_deref()
            .map(|v| parse("providers.default".to_string(), v))
            .transpose()?;
        let routing = self
            .routing
            .iter()
            .map(|(model, provider)| {
                parse(format!("providers.routing.{}", model), provider)
                    .map(|kind| (model.clone(), kind))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(ProviderConfig {
            default,
            routing,
            anthropic: (&self.anthropic).into(),
            openai: self.openai.resolve(OpenAiCompatibleConfig::default()),
            gemini: self.gemini.resolve(OpenAiCompatibleConfig::gemini()),
        })
    }
}
