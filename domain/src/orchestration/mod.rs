//! Orchestration pattern definitions.
//!
//! - [`pattern::OrchestrationPattern`] — which control-flow template wraps the provider call
//! - [`state::InvocationState`] — per-invocation lifecycle (`Start → Running → Done | Failed`)

pub mod pattern;
pub mod state;
