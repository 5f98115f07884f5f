//! Model registry, task-based selection, and fallback-chain ordering.
//!
//! The registry is built once at process start and shared read-only
//! (behind an `Arc`) by every concurrent request. Nothing here performs
//! I/O: credential availability is passed in as a predicate.

use super::config::{ModelConfig, ModelId, ModelTier, ProviderKind};
use super::endpoints::ProviderEndpoints;
use super::task::TaskKind;
use crate::core::error::DomainError;
use std::collections::HashSet;

/// Ranking policy for fallback-chain ordering. Lower ranks are tried first.
///
/// - `prefer_local = true`:  Local → Commercial → Fallback
/// - `prefer_local = false`: Commercial → Local → Fallback
///
/// The Fallback tier always ranks last. Callers can bypass this policy
/// entirely with an explicit chain on the request.
pub fn tier_rank(tier: ModelTier, prefer_local: bool) -> u8 {
    match (tier, prefer_local) {
        (ModelTier::Local, true) | (ModelTier::Commercial, false) => 0,
        (ModelTier::Commercial, true) | (ModelTier::Local, false) => 1,
        (ModelTier::Fallback, _) => 2,
    }
}

/// Read-only catalog of model configurations.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
    /// Index of the designated last-resort model (first Fallback-tier entry).
    fallback: usize,
}

impl ModelRegistry {
    /// Build a registry, validating that ids are unique and that a
    /// Fallback-tier model exists.
    pub fn new(models: Vec<ModelConfig>) -> Result<Self, DomainError> {
        if models.is_empty() {
            return Err(DomainError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.id.clone()) {
                return Err(DomainError::DuplicateModel(model.id.to_string()));
            }
        }

        let fallback = models
            .iter()
            .position(|m| m.tier == ModelTier::Fallback)
            .ok_or(DomainError::MissingFallback)?;

        if models[fallback].requires_credential() {
            return Err(DomainError::InvalidConfig(format!(
                "fallback model {} must not require a credential",
                models[fallback].id
            )));
        }

        Ok(Self { models, fallback })
    }

    /// The built-in catalog: three local models, two commercial models,
    /// and the fallback gateway.
    pub fn builtin(endpoints: &ProviderEndpoints) -> Self {
        let mut models = vec![
            ModelConfig::new(
                "deepseek-r1-local",
                ProviderKind::LocalChat,
                &endpoints.ollama.base_url,
                "deepseek-r1:14b",
                ModelTier::Local,
            )
            .with_max_tokens(8192)
            .with_capabilities(["reasoning", "coding"]),
            ModelConfig::new(
                "qwen2.5-local",
                ProviderKind::OpenAiCompatible,
                &endpoints.vllm.base_url,
                "Qwen/Qwen2.5-14B-Instruct",
                ModelTier::Local,
            )
            .with_max_tokens(8192)
            .with_capabilities(["planning", "tools"]),
            ModelConfig::new(
                "llama3.1-local",
                ProviderKind::LocalChat,
                &endpoints.ollama.base_url,
                "llama3.1:8b",
                ModelTier::Local,
            )
            .with_max_tokens(8192)
            .with_capabilities(["synthesis", "research"]),
            ModelConfig::new(
                "gpt-4o",
                ProviderKind::OpenAiCompatible,
                &endpoints.openai.base_url,
                "gpt-4o",
                ModelTier::Commercial,
            )
            .with_max_tokens(16384)
            .with_capabilities(["reasoning", "coding", "planning", "tools"]),
            ModelConfig::new(
                "claude-sonnet",
                ProviderKind::Anthropic,
                &endpoints.anthropic.base_url,
                "claude-sonnet-4-5",
                ModelTier::Commercial,
            )
            .with_max_tokens(8192)
            .with_capabilities(["reasoning", "synthesis", "research"]),
            ModelConfig::new(
                "gateway-fallback",
                ProviderKind::OpenAiCompatible,
                &endpoints.gateway.base_url,
                "openai",
                ModelTier::Fallback,
            )
            .with_max_tokens(4096)
            .with_capabilities(["reasoning", "planning", "synthesis"]),
        ];

        // Credential names come from configuration, not from the catalog.
        let key_for = |model: &ModelConfig| match (model.provider_kind, model.tier) {
            (_, ModelTier::Fallback) => None,
            (ProviderKind::Anthropic, _) => endpoints.anthropic.api_key_env.clone(),
            (ProviderKind::OpenAiCompatible, ModelTier::Commercial) => {
                endpoints.openai.api_key_env.clone()
            }
            (ProviderKind::OpenAiCompatible, _) => endpoints.vllm.api_key_env.clone(),
            (ProviderKind::LocalChat, _) => endpoints.ollama.api_key_env.clone(),
        };
        for model in &mut models {
            model.api_key_ref = key_for(model);
        }

        let fallback = models.len() - 1;
        Self { models, fallback }
    }

    /// Append extra entries (e.g. from the config file), re-validating.
    pub fn extend(self, extra: Vec<ModelConfig>) -> Result<Self, DomainError> {
        if extra.is_empty() {
            return Ok(self);
        }
        let mut models = self.models;
        models.extend(extra);
        Self::new(models)
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    pub fn get(&self, id: &ModelId) -> Option<&ModelConfig> {
        self.models.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.get(id).is_some()
    }

    /// The designated last-resort model.
    pub fn fallback_model(&self) -> &ModelConfig {
        &self.models[self.fallback]
    }

    /// Pick a model for `task`.
    ///
    /// With `prefer_local`, the best Local-tier model carrying the task's
    /// capability is chosen. Otherwise the first Commercial-tier model with
    /// that capability whose credential is available wins, falling back to
    /// the local choice when no credential is configured.
    pub fn select_model(
        &self,
        task: TaskKind,
        prefer_local: bool,
        has_credential: impl Fn(&str) -> bool,
    ) -> ModelId {
        let capability = task.capability();

        if !prefer_local
            && let Some(model) = self.models.iter().find(|m| {
                m.tier == ModelTier::Commercial
                    && m.has_capability(capability)
                    && m.api_key_ref.as_deref().is_none_or(&has_credential)
            })
        {
            return model.id.clone();
        }

        self.best_local(capability).id.clone()
    }

    fn best_local(&self, capability: &str) -> &ModelConfig {
        let mut locals = self.models.iter().filter(|m| m.tier == ModelTier::Local);
        locals
            .clone()
            .find(|m| m.has_capability(capability))
            .or_else(|| locals.next())
            .unwrap_or_else(|| self.fallback_model())
    }

    /// Order every other registry entry into a trial sequence after `primary`.
    ///
    /// The result excludes `primary`, has no duplicates, is sorted by
    /// [`tier_rank`] (stable in registry order), and ends with the
    /// designated fallback model unless `primary` is that model.
    pub fn build_chain(&self, primary: &ModelId, prefer_local: bool) -> Vec<ModelId> {
        let mut candidates: Vec<(usize, &ModelConfig)> = self
            .models
            .iter()
            .enumerate()
            .filter(|(_, m)| &m.id != primary)
            .collect();

        candidates.sort_by_key(|(idx, m)| {
            (
                tier_rank(m.tier, prefer_local),
                // The designated fallback sorts after any other Fallback-tier entry
                u8::from(*idx == self.fallback),
                *idx,
            )
        });

        candidates.into_iter().map(|(_, m)| m.id.clone()).collect()
    }

    /// Normalise a caller-supplied chain: drop `primary`, duplicates, and
    /// ids the registry does not know. Returns `(chain, unknown_ids)`.
    pub fn normalize_chain(
        &self,
        primary: &ModelId,
        explicit: &[ModelId],
    ) -> (Vec<ModelId>, Vec<ModelId>) {
        let mut seen: HashSet<&ModelId> = HashSet::from([primary]);
        let mut chain = Vec::new();
        let mut unknown = Vec::new();

        for id in explicit {
            if !seen.insert(id) {
                continue;
            }
            if self.contains(id) {
                chain.push(id.clone());
            } else {
                unknown.push(id.clone());
            }
        }

        (chain, unknown)
    }
}
