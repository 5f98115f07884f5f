//! Inference routing use case
//!
//! Selects a model for the request, orders a fallback chain behind it,
//! and walks the chain until one model answers. Never returns an error:
//! exhaustion is reported in the [`LlmResponse`].

use super::orchestrate::Orchestrator;
use crate::config::RouterConfig;
use crate::ports::credentials::CredentialResolver;
use crate::ports::provider_gateway::ProviderGateway;
use deepdive_domain::{LlmRequest, LlmResponse, ModelId, ModelRegistry};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Routes requests across the model registry
pub struct InferenceRouter<G: ProviderGateway + 'static> {
    registry: Arc<ModelRegistry>,
    credentials: Arc<dyn CredentialResolver>,
    orchestrator: Orchestrator<G>,
    config: RouterConfig,
}

impl<G: ProviderGateway + 'static> InferenceRouter<G> {
    pub fn new(
        registry: Arc<ModelRegistry>,
        gateway: Arc<G>,
        credentials: Arc<dyn CredentialResolver>,
        config: RouterConfig,
    ) -> Self {
        let orchestrator = Orchestrator::new(gateway).with_call_timeout(config.call_timeout);
        Self {
            registry,
            credentials,
            orchestrator,
            config,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn prefer_local(&self, request: &LlmRequest) -> bool {
        request.prefer_local || self.config.prefer_local
    }

    /// The model tried first: the explicit override when the registry
    /// knows it, otherwise task-based selection.
    pub fn select(&self, request: &LlmRequest) -> ModelId {
        if let Some(model) = &request.model {
            if self.registry.contains(model) {
                return model.clone();
            }
            warn!("Unknown model override {}, using task selection", model);
        }
        self.registry.select_model(
            request.task_or_default(),
            self.prefer_local(request),
            |key_ref| self.credentials.has(key_ref),
        )
    }

    /// `[selected, ...chain]` where the chain is the request's explicit
    /// one (normalised) or the registry ordering.
    pub fn trial_sequence(&self, request: &LlmRequest) -> Vec<ModelId> {
        let primary = self.select(request);
        let chain = match &request.fallback_chain {
            Some(explicit) => {
                let (chain, unknown) = self.registry.normalize_chain(&primary, explicit);
                for id in unknown {
                    warn!("Skipping unknown model {} in fallback chain", id);
                }
                chain
            }
            None => self
                .registry
                .build_chain(&primary, self.prefer_local(request)),
        };

        let mut sequence = Vec::with_capacity(chain.len() + 1);
        sequence.push(primary);
        sequence.extend(chain);
        sequence
    }

    /// Try each model in the trial sequence until one succeeds.
    pub async fn execute(&self, request: &LlmRequest) -> LlmResponse {
        let start = Instant::now();
        let sequence = self.trial_sequence(request);
        let mut fallbacks_used: Vec<ModelId> = Vec::new();
        let mut failures: Vec<String> = Vec::new();

        for id in sequence {
            let Some(model) = self.registry.get(&id) else {
                continue;
            };

            let credential = match &model.api_key_ref {
                Some(key_ref) => match self.credentials.get(key_ref) {
                    Some(value) => Some(value),
                    None => {
                        warn!("Skipping model {}: credential {} not set", id, key_ref);
                        failures.push(format!("{id} (missing credential {key_ref})"));
                        fallbacks_used.push(id);
                        continue;
                    }
                },
                None => None,
            };

            debug!(
                "Dispatching to model {} via {} ({})",
                id, model.provider_kind, request.orchestration
            );
            match self
                .orchestrator
                .run(model, credential.as_deref(), request)
                .await
            {
                Ok(completion) => {
                    info!(
                        "Model {} answered after {} fallback(s)",
                        id,
                        fallbacks_used.len()
                    );
                    return LlmResponse::success(
                        id,
                        model.provider_kind,
                        completion,
                        fallbacks_used,
                        elapsed_ms(start),
                    );
                }
                Err(e) => {
                    warn!("Model {} failed: {}", id, e);
                    failures.push(format!("{id} ({e})"));
                    fallbacks_used.push(id);
                }
            }
        }

        let error = if failures.is_empty() {
            "no models available".to_string()
        } else {
            format!("all models failed: {}", failures.join("; "))
        };
        warn!("{}", error);
        LlmResponse::failure(fallbacks_used, error, elapsed_ms(start))
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::credentials::StaticCredentials;
    use crate::ports::provider_gateway::ProviderError;
    use crate::use_cases::test_support::{MockGateway, http_500, reply, three_tier_registry};
    use deepdive_domain::{
        ModelConfig, ModelTier, OrchestrationPattern, ProviderKind, RetryPolicy, TaskKind,
    };
    use std::time::Duration;

    fn router(gateway: Arc<MockGateway>, credentials: StaticCredentials) -> InferenceRouter<MockGateway> {
        InferenceRouter::new(
            Arc::new(three_tier_registry()),
            gateway,
            Arc::new(credentials),
            RouterConfig::default(),
        )
    }

    fn with_openai_key() -> StaticCredentials {
        StaticCredentials::new().with("OPENAI_API_KEY", "sk-test")
    }

    fn ids(list: &[ModelId]) -> Vec<&str> {
        list.iter().map(ModelId::as_str).collect()
    }

    #[tokio::test]
    async fn test_local_http_500_falls_back_to_commercial() {
        let gateway = Arc::new(MockGateway::ok().script("local", vec![Err(http_500())]));
        let router = router(gateway.clone(), with_openai_key());
        let request = LlmRequest::from_prompt("sys", "hi").with_prefer_local(true);

        let response = router.execute(&request).await;

        assert!(response.success);
        assert_eq!(response.model_used, Some(ModelId::from("commercial")));
        assert_eq!(ids(&response.fallbacks_used), vec!["local"]);
        assert_eq!(response.provider, Some(ProviderKind::OpenAiCompatible));
        assert_eq!(gateway.calls()[1].credential.as_deref(), Some("sk-test"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fall_through_to_fallback() {
        let registry = ModelRegistry::new(vec![
            ModelConfig::new("local", ProviderKind::OpenAiCompatible, "http://vllm", "qwen", ModelTier::Local)
                .with_capabilities(["reasoning"])
                .with_api_key_ref("VLLM_API_KEY"),
            ModelConfig::new("commercial", ProviderKind::Anthropic, "https://api.anthropic.com", "claude", ModelTier::Commercial)
                .with_capabilities(["reasoning"])
                .with_api_key_ref("ANTHROPIC_API_KEY"),
            ModelConfig::new("fallback", ProviderKind::OpenAiCompatible, "https://gw", "openai", ModelTier::Fallback),
        ])
        .unwrap();
        let gateway = Arc::new(MockGateway::ok());
        let router = InferenceRouter::new(
            Arc::new(registry),
            gateway.clone(),
            Arc::new(StaticCredentials::new()),
            RouterConfig::default(),
        );

        let response = router.execute(&LlmRequest::from_prompt("sys", "hi")).await;

        assert!(response.success);
        assert_eq!(response.model_used, Some(ModelId::from("fallback")));
        assert_eq!(ids(&response.fallbacks_used), vec!["local", "commercial"]);
        // Skipped models are never dispatched
        assert_eq!(gateway.called_models(), vec!["fallback"]);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_model() {
        let gateway = Arc::new(MockGateway::with_responder(|_, _| Err(http_500())));
        let router = router(gateway, StaticCredentials::new());

        let response = router.execute(&LlmRequest::from_prompt("sys", "hi")).await;

        assert!(!response.success);
        assert!(response.content.is_empty());
        assert!(response.model_used.is_none());
        assert_eq!(ids(&response.fallbacks_used), vec!["local", "commercial", "fallback"]);
        let error = response.error.unwrap();
        assert!(error.contains("commercial (missing credential OPENAI_API_KEY)"));
        assert!(error.contains("fallback (HTTP 500: internal error)"));
    }

    #[tokio::test]
    async fn test_commercial_selected_when_credential_present() {
        let gateway = Arc::new(MockGateway::ok());
        let router = router(gateway, with_openai_key());
        let request = LlmRequest::from_prompt("sys", "hi").with_task(TaskKind::Reasoning);

        let sequence = router.trial_sequence(&request);
        assert_eq!(ids(&sequence), vec!["commercial", "local", "fallback"]);

        let response = router.execute(&request).await;
        assert_eq!(response.model_used, Some(ModelId::from("commercial")));
        assert!(response.fallbacks_used.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_chain_overrides_registry_order() {
        let gateway = Arc::new(MockGateway::ok().script("local", vec![Err(ProviderError::Timeout)]));
        let router = router(gateway.clone(), with_openai_key());
        let request = LlmRequest::from_prompt("sys", "hi")
            .with_model("local")
            .with_fallback_chain(vec!["fallback".into(), "nope".into(), "local".into()]);

        assert_eq!(ids(&router.trial_sequence(&request)), vec!["local", "fallback"]);
        let response = router.execute(&request).await;
        assert_eq!(response.model_used, Some(ModelId::from("fallback")));
        assert_eq!(gateway.called_models(), vec!["local", "fallback"]);
    }

    #[tokio::test]
    async fn test_unknown_model_override_uses_selection() {
        let router = router(Arc::new(MockGateway::ok()), StaticCredentials::new());
        let request = LlmRequest::from_prompt("sys", "hi").with_model("gpt-9");
        assert_eq!(router.select(&request), ModelId::from("local"));
    }

    #[tokio::test]
    async fn test_config_prefer_local_applies_without_request_flag() {
        let router = InferenceRouter::new(
            Arc::new(three_tier_registry()),
            Arc::new(MockGateway::ok()),
            Arc::new(with_openai_key()),
            RouterConfig::default().with_prefer_local(true),
        );
        let request = LlmRequest::from_prompt("sys", "hi");
        assert_eq!(ids(&router.trial_sequence(&request)), vec!["local", "commercial", "fallback"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_retry_execution_time_includes_backoff() {
        let gateway = Arc::new(MockGateway::ok().script(
            "local",
            vec![Err(http_500()), Err(http_500()), Ok(reply("finally"))],
        ));
        let router = router(gateway, StaticCredentials::new());
        let request = LlmRequest::from_prompt("sys", "hi")
            .with_orchestration(OrchestrationPattern::BoundedRetry(RetryPolicy::new(3, 500)));

        let response = router.execute(&request).await;

        assert!(response.success);
        assert_eq!(response.content, "finally");
        assert_eq!(response.model_used, Some(ModelId::from("local")));
        assert!(response.fallbacks_used.is_empty());
        // 500ms + 1000ms of backoff
        assert!(response.execution_time_ms >= 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_advances_chain() {
        let gateway = Arc::new(MockGateway::ok().with_delay(Duration::from_secs(600)));
        let router = InferenceRouter::new(
            Arc::new(three_tier_registry()),
            gateway.clone(),
            Arc::new(StaticCredentials::new()),
            RouterConfig::default().with_call_timeout(Duration::from_secs(1)),
        );
        let response = router.execute(&LlmRequest::from_prompt("sys", "hi")).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("local (Timeout)"));
        assert_eq!(gateway.called_models(), vec!["local", "fallback"]);
    }
}
