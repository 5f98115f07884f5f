//! Domain layer for deepdive
//!
//! This crate contains the core routing policy, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Inference routing
//!
//! - **Model registry**: a read-only catalog of [`ModelConfig`] entries,
//!   each tagged with a [`ProviderKind`] (wire format) and a [`ModelTier`]
//! - **Task-based selection**: [`ModelRegistry::select_model`] maps a
//!   [`TaskKind`] to the best model for the caller's locality preference
//! - **Fallback chain**: [`ModelRegistry::build_chain`] orders the remaining
//!   models by [`tier_rank`], always ending with the Fallback tier
//!
//! ## Research
//!
//! - **Research task**: [`ResearchTask`] accumulates sub-questions, sources,
//!   and verified facts as the pipeline advances through [`ResearchState`]
//! - **Structured output**: [`parse_structured_or_default`] is the single
//!   recovery policy for JSON the model was asked to emit

pub mod core;
pub mod inference;
pub mod model;
pub mod orchestration;
pub mod prompt;
pub mod research;
pub mod util;

// Re-export commonly used types
pub use crate::core::{
    error::DomainError,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use inference::{
    message::{ChatMessage, Role},
    request::LlmRequest,
    response::{Completion, LlmResponse, Usage},
};
pub use model::{
    config::{ModelConfig, ModelId, ModelTier, ProviderKind},
    endpoints::{ProviderEndpoint, ProviderEndpoints},
    registry::{ModelRegistry, tier_rank},
    task::TaskKind,
};
pub use orchestration::{
    pattern::{CrewAgent, GraphPhase, OrchestrationPattern, RetryPolicy},
    state::InvocationState,
};
pub use prompt::{OrchestrationPrompt, ResearchPrompt};
pub use research::{
    entities::{ResearchState, ResearchTask, SourceInfo, VerifiedFact},
    parsing::{FactReport, StructuredOutput, SubQuestionPlan, parse_structured, parse_structured_or_default},
    request::{ReportType, ResearchMetadata, ResearchReport, ResearchRequest, ResearchResponse},
    source::{CrawledPage, ScrapedPage, SearchHit, merge_hits, rank_sources},
};
