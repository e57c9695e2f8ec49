//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// Each model acts as an independent navigator judging the extraction
/// profiles. Unknown identifiers are carried as [`Model::Custom`] and routed
/// through the provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Model {
    // Claude models
    ClaudeOpus41,
    ClaudeSonnet45,
    ClaudeHaiku45,
    // GPT models
    Gpt5,
    Gpt5Mini,
    Gpt41,
    O3,
    // Gemini models
    Gemini25Pro,
    Gemini25Flash,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::ClaudeOpus41 => "claude-opus-4-1",
            Model::ClaudeSonnet45 => "claude-sonnet-4-5",
            Model::ClaudeHaiku45 => "claude-haiku-4-5",
            Model::Gpt5 => "gpt-5",
            Model::Gpt5Mini => "gpt-5-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::O3 => "o3",
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Custom(s) => s,
        }
    }

    /// Get the default set of navigator models
    pub fn default_models() -> Vec<Model> {
        vec![Model::ClaudeSonnet45, Model::Gpt5, Model::Gemini25Pro]
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        match self {
            Model::ClaudeOpus41 | Model::ClaudeSonnet45 | Model::ClaudeHaiku45 => true,
            Model::Custom(s) => s.starts_with("claude"),
            _ => false,
        }
    }

    /// Check if this is a GPT or o-series model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt5 | Model::Gpt5Mini | Model::Gpt41 | Model::O3 => true,
            Model::Custom(s) => s.starts_with("gpt") || is_o_series(s),
            _ => false,
        }
    }

    /// Check if this is a Gemini model
    pub fn is_gemini(&self) -> bool {
        match self {
            Model::Gemini25Pro | Model::Gemini25Flash => true,
            Model::Custom(s) => s.starts_with("gemini"),
            _ => false,
        }
    }

    /// Reasoning-family OpenAI models reject `max_tokens` and `temperature`.
    pub fn is_openai_reasoning(&self) -> bool {
        let id = self.as_str();
        id.starts_with("gpt-5") || is_o_series(id)
    }
}

fn is_o_series(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

impl Default for Model {
    /// Returns the default model (Claude Sonnet 4.5)
    fn default() -> Self {
        Model::ClaudeSonnet45
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "claude-opus-4-1" => Model::ClaudeOpus41,
            "claude-sonnet-4-5" => Model::ClaudeSonnet45,
            "claude-haiku-4-5" => Model::ClaudeHaiku45,
            "gpt-5" => Model::Gpt5,
            "gpt-5-mini" => Model::Gpt5Mini,
            "gpt-4.1" => Model::Gpt41,
            "o3" => Model::O3,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
