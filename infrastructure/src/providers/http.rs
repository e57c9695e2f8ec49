//! Helpers shared by the HTTP provider clients.

use navigator_application::GatewayError;
use navigator_domain::core::string::truncate;
use navigator_domain::evaluation::parsing::extract_json_object;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Error body returned by both Anthropic and OpenAI-style APIs.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Resolve an API key: direct value first, then the named environment variable.
pub(crate) fn resolve_api_key(direct: Option<&str>, env_var: &str) -> Result<String, GatewayError> {
    if let Some(key) = direct
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(GatewayError::Auth(format!("{} is not set", env_var))),
    }
}

/// Map a non-success HTTP status to the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate(body.trim(), 200));
    let message = format!("{}: {}", status, detail);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth(message),
        _ => GatewayError::Transport(message),
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Extract the JSON object from the model's text output.
pub(crate) fn parse_model_output(text: &str) -> Result<Value, GatewayError> {
    extract_json_object(text).ok_or_else(|| {
        GatewayError::Parse(format!(
            "no JSON object in response: {}",
            truncate(text.trim(), 120)
        ))
    })
}
