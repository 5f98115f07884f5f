//! Anthropic Messages API (`POST {endpoint}/v1/messages`).

use super::PreparedRequest;
use deepdive_application::ProviderError;
use deepdive_domain::{Completion, LlmRequest, ModelConfig, Role, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// System messages are joined into the top-level `system` field; every
/// other message is sent as `user` or `assistant`.
pub(super) fn build_request(
    model: &ModelConfig,
    credential: Option<&str>,
    request: &LlmRequest,
) -> PreparedRequest {
    let system_parts: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.is_system())
        .map(|m| m.content.as_str())
        .collect();
    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));

    let messages = request
        .messages
        .iter()
        .filter(|m| !m.is_system())
        .map(|m| WireMessage {
            role: match m.role {
                Role::Assistant => "assistant",
                _ => "user",
            },
            content: &m.content,
        })
        .collect();

    let body = CreateMessageRequest {
        model: &model.wire_model_name,
        max_tokens: model.effective_max_tokens(request.max_tokens),
        system,
        messages,
        temperature: request.temperature,
        tools: request.tools.as_deref().filter(|t| !t.is_empty()),
    };

    let mut prepared = PreparedRequest::new(
        format!("{}/v1/messages", model.endpoint.trim_end_matches('/')),
        serde_json::to_value(&body).unwrap_or(Value::Null),
    )
    .header("anthropic-version", ANTHROPIC_VERSION.to_string());
    if let Some(key) = credential {
        prepared = prepared.header("x-api-key", key.to_string());
    }
    prepared
}

pub(super) fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: MessageResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("messages response: {e}")))?;

    let content = response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| ProviderError::InvalidResponse("no text content block".into()))?;

    let usage = response
        .usage
        .map(|u| Usage::from_counts(u.input_tokens, u.output_tokens));

    Ok(Completion::new(content, usage))
}
