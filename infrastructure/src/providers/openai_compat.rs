//! OpenAI-compatible chat completions (`POST {endpoint}/chat/completions`).
//!
//! Spoken by commercial GPT-style APIs, vLLM/TGI servers, and the
//! fallback gateway.

use super::PreparedRequest;
use deepdive_application::ProviderError;
use deepdive_domain::{ChatMessage, Completion, LlmRequest, ModelConfig, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
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
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

pub(super) fn build_request(
    model: &ModelConfig,
    credential: Option<&str>,
    request: &LlmRequest,
) -> PreparedRequest {
    let body = ChatCompletionRequest {
        model: &model.wire_model_name,
        messages: request.messages.iter().map(wire_message).collect(),
        max_tokens: model.effective_max_tokens(request.max_tokens),
        temperature: request.temperature,
        tools: request.tools.as_deref().filter(|t| !t.is_empty()),
    };

    let mut prepared = PreparedRequest::new(
        format!("{}/chat/completions", model.endpoint.trim_end_matches('/')),
        serde_json::to_value(&body).unwrap_or(Value::Null),
    );
    if let Some(key) = credential {
        prepared = prepared.header("Authorization", format!("Bearer {key}"));
    }
    prepared
}

fn wire_message(message: &ChatMessage) -> WireMessage<'_> {
    WireMessage {
        role: message.role.as_str(),
        content: &message.content,
    }
}

pub(super) fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("chat completion: {e}")))?;

    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".into()))?;

    let content = match message.tool_calls {
        Some(calls) if !calls.is_empty() => serde_json::to_string(&calls)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?,
        _ => message.content.unwrap_or_default(),
    };

    let usage = response.usage.map(|u| {
        let mut usage = Usage::from_counts(u.prompt_tokens, u.completion_tokens);
        if let Some(total) = u.total_tokens {
            usage.total_tokens = total;
        }
        usage
    });

    Ok(Completion::new(content, usage))
}
