//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod credentials;
pub mod event_logger;
pub mod progress;
pub mod provider_gateway;
pub mod source_provider;
