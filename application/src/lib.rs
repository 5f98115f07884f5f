//! Application layer for deepdive
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ResearchConfig, RouterConfig};
pub use ports::{
    credentials::{CredentialResolver, StaticCredentials},
    event_logger::{NoEventLogger, ResearchEvent, ResearchEventLogger},
    progress::{NoProgress, ResearchProgressNotifier},
    provider_gateway::{ProviderError, ProviderGateway},
    source_provider::{SourceError, SourceProvider},
};
pub use use_cases::orchestrate::{OrchestrationError, Orchestrator};
pub use use_cases::route_inference::InferenceRouter;
pub use use_cases::run_research::{ResearchError, RunResearchUseCase};
