//! Inference request value object

use super::message::ChatMessage;
use crate::model::config::ModelId;
use crate::model::task::TaskKind;
use crate::orchestration::pattern::OrchestrationPattern;
use serde::{Deserialize, Serialize};

/// Default token budget when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A routed inference request. Created per call and never mutated by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<ChatMessage>,
    /// Drives model selection when `model` is not set.
    #[serde(default)]
    pub task: Option<TaskKind>,
    /// Explicit primary model; skips task-based selection.
    #[serde(default)]
    pub model: Option<ModelId>,
    /// Explicit trial order after the primary; overrides the ranking policy.
    #[serde(default)]
    pub fallback_chain: Option<Vec<ModelId>>,
    #[serde(default)]
    pub orchestration: OrchestrationPattern,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Tool definitions forwarded verbatim to adapters that support them.
    #[serde(default)]
    pub tools: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub prefer_local: bool,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            task: None,
            model: None,
            fallback_chain: None,
            orchestration: OrchestrationPattern::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            tools: None,
            prefer_local: false,
        }
    }

    /// Convenience: system prompt + single user turn.
    pub fn from_prompt(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    pub fn with_task(mut self, task: TaskKind) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_fallback_chain(mut self, chain: Vec<ModelId>) -> Self {
        self.fallback_chain = Some(chain);
        self
    }

    pub fn with_orchestration(mut self, pattern: OrchestrationPattern) -> Self {
        self.orchestration = pattern;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = prefer_local;
        self
    }

    pub fn task_or_default(&self) -> TaskKind {
        self.task.unwrap_or_default()
    }

    /// Copy of this request with different messages and a plain Simple
    /// pattern. Used by orchestration patterns to issue their inner calls.
    pub fn derive_call(&self, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            orchestration: OrchestrationPattern::Simple,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = LlmRequest::from_prompt("sys", "hello");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(req.orchestration, OrchestrationPattern::Simple);
        assert_eq!(req.task_or_default(), TaskKind::General);
        assert!(!req.prefer_local);
    }

    #[test]
    fn test_derive_call_resets_pattern() {
        let req = LlmRequest::from_prompt("sys", "hello")
            .with_orchestration(OrchestrationPattern::PhasedGraph)
            .with_max_tokens(100);
        let inner = req.derive_call(vec![ChatMessage::user("x")]);
        assert_eq!(inner.orchestration, OrchestrationPattern::Simple);
        assert_eq!(inner.max_tokens, 100);
        assert_eq!(inner.messages, vec![ChatMessage::user("x")]);
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{
            "messages": [{"role": "user", "content": "hi"}],
            "max_tokens": 256,
            "temperature": 0.2
        }"#;
        let req: LlmRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.max_tokens, 256);
        assert!(req.fallback_chain.is_none());
        assert_eq!(req.orchestration, OrchestrationPattern::Simple);
    }
}
