//! Infrastructure layer for deepdive
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider wire formats over HTTP, web sources,
//! the environment credential snapshot, configuration file loading, and
//! JSONL event logging.

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;
pub mod sources;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use credentials::EnvCredentialResolver;
pub use logging::JsonlEventLogger;
pub use providers::{HttpProviderGateway, PreparedRequest, WireAdapter};
pub use sources::{WebSourceConfig, WebSourceProvider};
