//! Orchestration use case
//!
//! Runs one request against one model under the request's
//! [`OrchestrationPattern`]. Every pattern is built from the same
//! primitive: a single, timeout-bounded [`ProviderGateway::call`].

use crate::ports::provider_gateway::{ProviderError, ProviderGateway};
use deepdive_domain::{
    Completion, CrewAgent, GraphPhase, InvocationState, LlmRequest, ModelConfig,
    OrchestrationPattern, OrchestrationPrompt, RetryPolicy, Usage,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that end an orchestrated invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("all {steps} steps failed, last error: {last}")]
    AllStepsFailed { steps: usize, last: ProviderError },

    #[error("gave up after {attempts} attempts, last error: {last}")]
    RetriesExhausted { attempts: u32, last: ProviderError },
}

/// Executes orchestration patterns over a provider gateway
pub struct Orchestrator<G: ProviderGateway + 'static> {
    gateway: Arc<G>,
    call_timeout: Option<Duration>,
}

impl<G: ProviderGateway + 'static> Orchestrator<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            call_timeout: None,
        }
    }

    /// Bound every provider call made by any pattern.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Run `request` on `model` under `request.orchestration`.
    pub async fn run(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, OrchestrationError> {
        match &request.orchestration {
            OrchestrationPattern::Simple => Ok(self.call(model, credential, request).await?),
            OrchestrationPattern::PhasedGraph => {
                self.run_phased(model, credential, request).await
            }
            OrchestrationPattern::RoleCrew { agents } => {
                self.run_crew(model, credential, request, agents).await
            }
            OrchestrationPattern::BoundedRetry(policy) => {
                self.run_retry(model, credential, request, *policy).await
            }
        }
    }

    /// One gateway call, bounded by the configured timeout.
    async fn call(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, ProviderError> {
        let call = self.gateway.call(model, credential, request);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ProviderError::Timeout)),
            None => call.await,
        }
    }

    /// Analyze → Plan → Execute → Observe → Synthesize.
    ///
    /// A failed phase is skipped; later phases see only the outputs that
    /// succeeded. Content is the Synthesize output, or the last successful
    /// phase output when Synthesize itself failed.
    async fn run_phased(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, OrchestrationError> {
        let mut state = InvocationState::Start;
        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut usage: Option<Usage> = None;
        let mut last_error = None;
        let mut synthesized = None;

        for phase in GraphPhase::ALL {
            state = state.advance();
            debug!("Model {} phased graph {} ({})", model.id, phase, state);

            let messages = OrchestrationPrompt::phase_messages(phase, &request.messages, &outputs);
            match self.call(model, credential, &request.derive_call(messages)).await {
                Ok(completion) => {
                    accumulate(&mut usage, completion.usage);
                    if phase == GraphPhase::Synthesize {
                        synthesized = Some(completion.content.clone());
                    }
                    outputs.push((phase.display_name().to_string(), completion.content));
                }
                Err(e) => {
                    warn!("Model {} phase {} failed: {}", model.id, phase, e);
                    last_error = Some(e);
                }
            }
        }

        let content = synthesized.or_else(|| outputs.last().map(|(_, text)| text.clone()));
        finish(state, content, usage, last_error, GraphPhase::ALL.len())
    }

    /// Agents run in order, each seeing the outputs of the agents before it.
    /// Content is every successful agent's labeled output.
    async fn run_crew(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
        agents: &[CrewAgent],
    ) -> Result<Completion, OrchestrationError> {
        let mut state = InvocationState::Start;
        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut usage: Option<Usage> = None;
        let mut last_error = None;

        for agent in agents {
            state = state.advance();
            debug!("Model {} crew agent {} ({})", model.id, agent.name, state);

            let messages = OrchestrationPrompt::crew_messages(agent, &request.messages, &outputs);
            match self.call(model, credential, &request.derive_call(messages)).await {
                Ok(completion) => {
                    accumulate(&mut usage, completion.usage);
                    outputs.push((agent.name.clone(), completion.content));
                }
                Err(e) => {
                    warn!("Model {} agent {} failed: {}", model.id, agent.name, e);
                    last_error = Some(e);
                }
            }
        }

        let content = (!outputs.is_empty()).then(|| OrchestrationPrompt::labeled_outputs(&outputs));
        finish(state, content, usage, last_error, agents.len())
    }

    /// Simple call retried with exponential backoff.
    async fn run_retry(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
        policy: RetryPolicy,
    ) -> Result<Completion, OrchestrationError> {
        let attempts = policy.max_retries.max(1);
        let simple = request.derive_call(request.messages.clone());
        let mut state = InvocationState::Start;
        let mut last_error = ProviderError::Timeout;

        for attempt in 1..=attempts {
            state = state.advance();
            debug!("Model {} retry attempt {}/{} ({})", model.id, attempt, attempts, state);

            match self.call(model, credential, &simple).await {
                Ok(completion) => return Ok(completion),
                Err(e) => {
                    warn!(
                        "Model {} attempt {}/{} failed: {}",
                        model.id, attempt, attempts, e
                    );
                    last_error = e;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
        }

        debug!("Model {} retry invocation {}", model.id, state.finish(false));
        Err(OrchestrationError::RetriesExhausted {
            attempts,
            last: last_error,
        })
    }
}

fn accumulate(total: &mut Option<Usage>, usage: Option<Usage>) {
    if let Some(usage) = usage {
        *total = Some(total.unwrap_or_default() + usage);
    }
}

fn finish(
    state: InvocationState,
    content: Option<String>,
    usage: Option<Usage>,
    last_error: Option<ProviderError>,
    steps: usize,
) -> Result<Completion, OrchestrationError> {
    let state = state.finish(content.is_some());
    debug!("Invocation {}", state);
    match content {
        Some(content) => Ok(Completion::new(content, usage)),
        None => Err(OrchestrationError::AllStepsFailed {
            steps,
            last: last_error.unwrap_or(ProviderError::InvalidResponse("no steps ran".into())),
        }),
    }
}
