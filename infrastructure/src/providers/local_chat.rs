//! Local runtime chat API (`POST {endpoint}/api/chat`, non-streaming).

use super::PreparedRequest;
use deepdive_application::ProviderError;
use deepdive_domain::{Completion, LlmRequest, ModelConfig, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

pub(super) fn build_request(
    model: &ModelConfig,
    credential: Option<&str>,
    request: &LlmRequest,
) -> PreparedRequest {
    let body = ChatRequest {
        model: &model.wire_model_name,
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        stream: false,
        options: ChatOptions {
            num_predict: model.effective_max_tokens(request.max_tokens),
            temperature: request.temperature,
        },
    };

    let mut prepared = PreparedRequest::new(
        format!("{}/api/chat", model.endpoint.trim_end_matches('/')),
        serde_json::to_value(&body).unwrap_or(Value::Null),
    );
    if let Some(key) = credential {
        prepared = prepared.header("Authorization", format!("Bearer {key}"));
    }
    prepared
}

/// Usage is reported only when the runtime returns both eval counts.
pub(super) fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("chat response: {e}")))?;

    let usage = match (response.prompt_eval_count, response.eval_count) {
        (Some(prompt), Some(completion)) => Some(Usage::from_counts(prompt, completion)),
        _ => None,
    };

    Ok(Completion::new(response.message.content, usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepdive_domain::{ModelTier, ProviderKind};

    fn model() -> ModelConfig {
        ModelConfig::new(
            "llama3.1-local",
            ProviderKind::LocalChat,
            "http://localhost:11434",
            "llama3.1:8b",
            ModelTier::Local,
        )
        .with_max_tokens(2048)
    }

    #[test]
    fn test_build_request_shape() {
        let request = LlmRequest::from_prompt("sys", "hi").with_temperature(0.2);
        let prepared = build_request(&model(), None, &request);

        assert_eq!(prepared.url, "http://localhost:11434/api/chat");
        assert_eq!(prepared.body["model"], "llama3.1:8b");
        assert_eq!(prepared.body["stream"], false);
        assert_eq!(prepared.body["options"]["num_predict"], 2048);
        assert!((prepared.body["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(prepared.body["messages"][0]["role"], "system");
        assert!(prepared.headers.is_empty());
    }

    #[test]
    fn test_parse_with_eval_counts() {
        let body = r#"{"model":"llama3.1:8b","message":{"role":"assistant","content":"Hello"},
            "done":true,"prompt_eval_count":26,"eval_count":298}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.content, "Hello");
        assert_eq!(completion.usage, Some(Usage::from_counts(26, 298)));
    }

    #[test]
    fn test_parse_without_eval_counts() {
        let body = r#"{"message":{"role":"assistant","content":"Hello"}}"#;
        assert!(parse_response(body).unwrap().usage.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_message() {
        assert!(parse_response(r#"{"done": true}"#).is_err());
    }
}
