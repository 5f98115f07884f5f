//! Hand-written port mocks shared by the use case tests.

use crate::ports::provider_gateway::{ProviderError, ProviderGateway};
use async_trait::async_trait;
use deepdive_domain::{
    ChatMessage, Completion, LlmRequest, ModelConfig, ModelRegistry, ModelTier, ProviderKind,
    Usage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&ModelConfig, &LlmRequest) -> Result<Completion, ProviderError> + Send + Sync>;

/// One recorded gateway call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub credential: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// Gateway with scripted per-model outcomes.
///
/// Scripted outcomes for a model are consumed in order; once exhausted
/// (or when none were scripted) the responder decides.
pub struct MockGateway {
    scripts: Mutex<HashMap<String, VecDeque<Result<Completion, ProviderError>>>>,
    responder: Responder,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Every call succeeds with `"<model id> ok"`.
    pub fn ok() -> Self {
        Self::with_responder(|model, _| Ok(reply(&format!("{} ok", model.id))))
    }

    pub fn with_responder(
        responder: impl Fn(&ModelConfig, &LlmRequest) -> Result<Completion, ProviderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            responder: Box::new(responder),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(self, model: &str, outcomes: Vec<Result<Completion, ProviderError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), outcomes.into());
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }
}

#[async_trait]
impl ProviderGateway for MockGateway {
    async fn call(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.id.to_string(),
            credential: credential.map(str::to_string),
            messages: request.messages.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model.id.as_str())
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(outcome) => outcome,
            None => (self.responder)(model, request),
        }
    }
}

pub fn reply(content: &str) -> Completion {
    Completion::new(content, Some(Usage::from_counts(10, 5)))
}

pub fn http_500() -> ProviderError {
    ProviderError::Http {
        status: 500,
        body: "internal error".into(),
    }
}

/// Local / Commercial / Fallback, one model each.
pub fn three_tier_registry() -> ModelRegistry {
    ModelRegistry::new(vec![
        ModelConfig::new(
            "local",
            ProviderKind::LocalChat,
            "http://localhost:11434",
            "llama3.1",
            ModelTier::Local,
        )
        .with_capabilities(["reasoning", "planning", "synthesis"]),
        ModelConfig::new(
            "commercial",
            ProviderKind::OpenAiCompatible,
            "https://api.openai.com/v1",
            "gpt-4o",
            ModelTier::Commercial,
        )
        .with_capabilities(["reasoning", "planning", "synthesis"])
        .with_api_key_ref("OPENAI_API_KEY"),
        ModelConfig::new(
            "fallback",
            ProviderKind::OpenAiCompatible,
            "https://gateway.example",
            "openai",
            ModelTier::Fallback,
        ),
    ])
    .unwrap()
}
