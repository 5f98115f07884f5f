//! Use cases (application services)
//!
//! - [`orchestrate`] — one request on one model under an orchestration pattern
//! - [`route_inference`] — model selection and fallback-chain traversal
//! - [`run_research`] — the five-phase research pipeline

pub mod orchestrate;
pub mod route_inference;
pub mod run_research;

#[cfg(test)]
pub(crate) mod test_support;
