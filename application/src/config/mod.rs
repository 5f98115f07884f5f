//! Application-level configuration.
//!
//! Configuration types that control how use cases behave. Built once by
//! the CLI from the loaded file configuration and injected into the
//! router and pipeline constructors.
//!
//! - [`RouterConfig`] — call timeouts, request defaults, retry policy
//! - [`ResearchConfig`] — fan-out widths and content budgets

pub mod research_config;
pub mod router_config;

pub use research_config::ResearchConfig;
pub use router_config::RouterConfig;
