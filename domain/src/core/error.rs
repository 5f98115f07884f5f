//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These only arise while *building* domain objects (registry construction,
/// configuration conversion). Routing and research never surface them to
/// end users; they are reported once at process start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Model registry is empty")]
    EmptyRegistry,

    #[error("Model registry has no Fallback-tier model")]
    MissingFallback,

    #[error("Duplicate model id in registry: {0}")]
    DuplicateModel(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown provider kind: {0}")]
    UnknownProviderKind(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DomainError {
    /// Check if this error is caused by a registry shape problem
    /// (as opposed to a bad lookup or config value).
    pub fn is_registry_shape(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyRegistry
                | DomainError::MissingFallback
                | DomainError::DuplicateModel(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fallback_display() {
        assert_eq!(
            DomainError::MissingFallback.to_string(),
            "Model registry has no Fallback-tier model"
        );
    }

    #[test]
    fn test_registry_shape_check() {
        assert!(DomainError::EmptyRegistry.is_registry_shape());
        assert!(DomainError::DuplicateModel("x".into()).is_registry_shape());
        assert!(!DomainError::UnknownModel("x".into()).is_registry_shape());
        assert!(!DomainError::InvalidConfig("x".into()).is_registry_shape());
    }
}
