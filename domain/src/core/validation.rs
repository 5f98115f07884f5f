//! Structured configuration issues.
//!
//! Validation reports every problem it finds instead of stopping at the
//! first; callers decide whether warnings are fatal.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric field that must be positive is zero.
    ZeroValue { field: String },
    /// A `[[models]]` entry has a blank id.
    EmptyModelId,
    /// A `[[models]]` entry names a provider kind we cannot speak.
    UnknownProviderKind { model: String, value: String },
    /// A `[[models]]` entry names an unknown tier.
    UnknownTier { model: String, value: String },
    /// The merged registry is not valid (duplicate ids, missing fallback, ...).
    InvalidRegistry,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
