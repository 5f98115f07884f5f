//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — registry and configuration errors
//! - [`validation::ConfigIssue`] — structured configuration findings

pub mod error;
pub mod validation;
