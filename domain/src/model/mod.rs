//! Model catalog and routing policy.
//!
//! - [`config::ModelConfig`] — one registry entry (wire format, endpoint, tier)
//! - [`endpoints::ProviderEndpoints`] — where each provider lives, injected at startup
//! - [`registry::ModelRegistry`] — task-based selection and fallback-chain ordering
//! - [`task::TaskKind`] — the task tag carried by a request

pub mod config;
pub mod endpoints;
pub mod registry;
pub mod task;
