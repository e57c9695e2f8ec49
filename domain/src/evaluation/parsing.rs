//! JSON extraction from free-form model output.
//!
//! Models are asked for a bare JSON object but often wrap it in prose or a
//! Markdown code fence. These helpers recover the object without guessing
//! at its content; anything that is not a JSON object is rejected.

use serde_json::Value;

/// Extract the JSON object a model returned.
///
/// Tries, in order: the whole text, the first fenced code block, and the
/// span from the first `{` to the last `}`.
///
/// ```
/// use navigator_domain::evaluation::parsing::extract_json_object;
///
/// let text = "Here you go:\n```json\n{\"scores\": {}}\n```";
/// assert!(extract_json_object(text).is_some());
/// assert!(extract_json_object("no json here").is_none());
/// ```
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed)
        && let Some(value) = parse_object(fenced)
    {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&trimmed[start..=end])
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Body of the first ``` fence, with an optional language tag removed.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let body_start = after_open.find('\n')? + 1;
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}
