//! Gemini response parsing

use super::content::{Content, FunctionCall, Part, Role};
use super::messages::{LlmResponse, LlmUsage};
use serde_json::{Map, Value};
use tracing::debug;

/// Parse a `generateContent` response body
///
/// Refusals and empty answers are reported through the response's error
/// fields, not as `Err`, so the caller can surface them as events.
pub fn parse_google(response: &Value) -> LlmResponse {
    let usage = parse_usage(response);

    let candidate = match response["candidates"].as_array().and_then(|c| c.first()) {
        Some(candidate) => candidate,
        None => {
            let mut parsed = match response["promptFeedback"]["blockReason"].as_str() {
                Some(reason) => LlmResponse::from_error(
                    reason,
                    format!("Prompt was blocked by the model: {}", reason),
                ),
                None => LlmResponse::from_error("NO_CANDIDATES", "Model returned no candidates"),
            };
            parsed.usage = usage;
            return parsed;
        }
    };

    let finish_reason = candidate["finishReason"].as_str().map(str::to_string);
    let parts = parse_parts(candidate["content"]["parts"].as_array());

    let mut parsed = if parts.is_empty() {
        let code = finish_reason.clone().unwrap_or_else(|| "EMPTY_CONTENT".to_string());
        let message = candidate["finishMessage"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| "Model returned no content".to_string());
        LlmResponse::from_error(code, message)
    } else {
        LlmResponse::from_content(Content::new(Role::Model, parts))
    };

    parsed.finish_reason = finish_reason;
    parsed.usage = usage;
    parsed
}

fn parse_parts(raw: Option<&Vec<Value>>) -> Vec<Part> {
    let mut parts: Vec<Part> = Vec::new();

    for part in raw.into_iter().flatten() {
        if part["thought"].as_bool() == Some(true) {
            debug!("Skipping thought part");
            continue;
        }

        if let Some(text) = part["text"].as_str() {
            // Adjacent text chunks form one part
            match parts.last_mut() {
                Some(Part::Text(existing)) => existing.push_str(text),
                _ => parts.push(Part::text(text)),
            }
        } else if let Some(call) = part["functionCall"].as_object() {
            parts.push(Part::FunctionCall(FunctionCall {
                id: call.get("id").and_then(Value::as_str).map(str::to_string),
                name: call
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                args: call
                    .get("args")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            }));
        } else {
            debug!("Skipping unsupported response part: {}", part);
        }
    }

    parts
}

fn parse_usage(response: &Value) -> Option<LlmUsage> {
    let usage = response["usageMetadata"].as_object()?;
    let count = |key: &str| {
        usage
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };

    let prompt_tokens = count("promptTokenCount");
    let completion_tokens = count("candidatesTokenCount");
    let total_tokens = match count("totalTokenCount") {
        0 => prompt_tokens + completion_tokens,
        n => n,
    };

    Some(LlmUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}
