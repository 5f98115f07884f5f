//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and
//! domain types once, at startup.

mod models;
mod providers;
mod research;
mod router;

pub use models::FileModelEntry;
pub use providers::{FileProviderEndpoint, FileProvidersConfig};
pub use research::{FileResearchConfig, FileSourcesConfig};
pub use router::{FileRetryConfig, FileRouterConfig};

use deepdive_application::{ResearchConfig, RouterConfig};
use deepdive_domain::{ConfigIssue, ConfigIssueCode, DomainError, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Router defaults and timeouts
    pub router: FileRouterConfig,
    /// Bounded-Retry defaults
    pub retry: FileRetryConfig,
    /// Research pipeline fan-out and budgets
    pub research: FileResearchConfig,
    /// Web source provider settings
    pub sources: FileSourcesConfig,
    /// Provider endpoints and credential names
    pub providers: FileProvidersConfig,
    /// Extra registry entries appended to the built-in catalog
    pub models: Vec<FileModelEntry>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Zero timeouts, batch sizes, and budgets
    /// 2. Every `[[models]]` entry converts to a registry entry
    /// 3. The merged registry is well-formed
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Positive numeric fields
        let positive = [
            ("router.call_timeout_secs", self.router.call_timeout_secs as usize),
            ("router.default_max_tokens", self.router.default_max_tokens as usize),
            ("research.max_sources", self.research.max_sources),
            ("research.search_batch_size", self.research.search_batch_size),
            ("research.results_per_query", self.research.results_per_query),
            (
                "research.verification_content_limit",
                self.research.verification_content_limit,
            ),
            (
                "research.per_source_content_limit",
                self.research.per_source_content_limit,
            ),
            ("sources.request_timeout_secs", self.sources.request_timeout_secs as usize),
        ];
        for (field, value) in positive {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroValue {
                        field: field.to_string(),
                    },
                    format!("{field} cannot be 0"),
                ));
            }
        }
        if self.retry.max_retries == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "retry.max_retries".to_string(),
                },
                "retry.max_retries is 0, a single attempt will be made",
            ));
        }

        // 2. Model entries
        let mut converted = Vec::new();
        for entry in &self.models {
            match entry.to_model_config() {
                Ok(model) => converted.push(model),
                Err(issue) => issues.push(issue),
            }
        }

        // 3. Registry shape (duplicate ids against the built-in catalog)
        if let Err(e) = ModelRegistry::builtin(&self.providers.to_endpoints()).extend(converted) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidRegistry,
                e.to_string(),
            ));
        }

        issues
    }

    /// Built-in catalog plus every valid `[[models]]` entry.
    ///
    /// Entries that fail conversion are skipped; [`validate`](Self::validate)
    /// reports them.
    pub fn build_registry(&self) -> Result<ModelRegistry, DomainError> {
        let extra = self
            .models
            .iter()
            .filter_map(|entry| entry.to_model_config().ok())
            .collect();
        ModelRegistry::builtin(&self.providers.to_endpoints()).extend(extra)
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig::default()
            .with_prefer_local(self.router.prefer_local)
            .with_call_timeout(Duration::from_secs(self.router.call_timeout_secs.max(1)))
            .with_default_max_tokens(self.router.default_max_tokens.max(1))
            .with_default_temperature(self.router.default_temperature)
            .with_retry(self.retry.to_policy())
    }

    pub fn research_config(&self) -> ResearchConfig {
        ResearchConfig::default()
            .with_max_sources(self.research.max_sources.max(1))
            .with_search_batch_size(self.research.search_batch_size.max(1))
            .with_results_per_query(self.research.results_per_query.max(1))
            .with_scrape_top_n(self.research.scrape_top_n)
            .with_content_limits(
                self.research.verification_content_limit,
                self.research.per_source_content_limit,
            )
    }

    /// Credential names referenced by the registry this config builds.
    pub fn credential_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .build_registry()
            .map(|registry| {
                registry
                    .models()
                    .iter()
                    .filter_map(|m| m.api_key_ref.clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names.dedup();
        names
    }
}
