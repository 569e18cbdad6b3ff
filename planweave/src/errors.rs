//! Error types for the planweave compiler.
//!
//! Every failure mode of the configuration-to-graph pipeline is a
//! dedicated type; [`AssemblyError`] is the umbrella returned by the
//! public entry points. Errors are reported to the immediate caller,
//! never retried, and never accompanied by a partial graph.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for assembly operations.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A configuration key could not be classified.
    #[error("{0}")]
    AmbiguousKey(#[from] AmbiguousKeyError),

    /// A referenced component has no registered factory.
    #[error("{0}")]
    UnknownComponent(#[from] UnknownComponentError),

    /// A component directly or transitively contains itself.
    #[error("{0}")]
    CyclicReference(#[from] CyclicReferenceError),

    /// Parallel compilation would exceed the configured path ceiling.
    #[error("{0}")]
    PathLimit(#[from] PathLimitError),

    /// The requested configuration section does not exist.
    #[error("{0}")]
    SectionNotFound(#[from] SectionNotFoundError),

    /// A blueprint failed structural validation.
    #[error("{0}")]
    Validation(#[from] BlueprintValidationError),
}

/// Error raised when a key cannot be unambiguously classified as a
/// design, category, parameter, or attribute of its own section.
///
/// Only produced when the vocabulary is in strict mode; lenient parsing
/// records such keys as whole-key attributes instead.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Ambiguous key '{key}' in section '{section}': prefix matches no known item and suffix has no recognized role")]
pub struct AmbiguousKeyError {
    /// The section being parsed.
    pub section: String,
    /// The offending key, unsplit.
    pub key: String,
}

impl AmbiguousKeyError {
    /// Creates a new ambiguous key error.
    #[must_use]
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

/// Error raised when the registry has no factory for a referenced
/// component.
///
/// Carries the exact (name, design) pair that failed to resolve; fatal
/// for the enclosing compilation.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Unknown component '{name}' (design: {})", design.as_deref().unwrap_or("default"))]
pub struct UnknownComponentError {
    /// The component name that failed lookup.
    pub name: String,
    /// The design label attempted, if any.
    pub design: Option<String>,
}

impl UnknownComponentError {
    /// Creates a new unknown component error.
    #[must_use]
    pub fn new(name: impl Into<String>, design: Option<String>) -> Self {
        Self {
            name: name.into(),
            design,
        }
    }
}

/// Error raised when a component lists itself as a child, directly or
/// through intermediaries.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Cyclic component reference: {}", path.join(" -> "))]
pub struct CyclicReferenceError {
    /// The containment path forming the cycle, ending at the repeated
    /// name.
    pub path: Vec<String>,
}

impl CyclicReferenceError {
    /// Creates a new cyclic reference error from the offending path.
    #[must_use]
    pub const fn new(path: Vec<String>) -> Self {
        Self { path }
    }
}

/// Error raised when a parallel compilation would enumerate more paths
/// than the configured ceiling allows.
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize)]
#[error("Parallel compilation would produce {paths} paths, exceeding the limit of {limit}")]
pub struct PathLimitError {
    /// The number of paths the expansion would produce.
    pub paths: usize,
    /// The configured ceiling.
    pub limit: usize,
}

impl PathLimitError {
    /// Creates a new path limit error.
    #[must_use]
    pub const fn new(paths: usize, limit: usize) -> Self {
        Self { paths, limit }
    }
}

/// Error raised when a required configuration section is missing from
/// the settings store.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Configuration section '{name}' not found")]
pub struct SectionNotFoundError {
    /// The missing section name.
    pub name: String,
}

impl SectionNotFoundError {
    /// Creates a new section not found error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error raised when a blueprint fails structural validation.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct BlueprintValidationError {
    /// The error message.
    pub message: String,
    /// The items involved in the error, if any.
    pub items: Vec<String>,
}

impl BlueprintValidationError {
    /// Creates a new blueprint validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Sets the items involved.
    #[must_use]
    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_component_display() {
        let err = UnknownComponentError::new("svm", Some("compare".to_string()));
        assert_eq!(err.to_string(), "Unknown component 'svm' (design: compare)");

        let err = UnknownComponentError::new("svm", None);
        assert!(err.to_string().contains("design: default"));
    }

    #[test]
    fn test_cyclic_reference_display() {
        let err = CyclicReferenceError::new(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn test_path_limit_display() {
        let err = PathLimitError::new(8192, 4096);
        let msg = err.to_string();
        assert!(msg.contains("8192"));
        assert!(msg.contains("4096"));
    }

    #[test]
    fn test_assembly_error_from_conversions() {
        let err: AssemblyError = SectionNotFoundError::new("data").into();
        assert!(matches!(err, AssemblyError::SectionNotFound(_)));

        let err: AssemblyError = AmbiguousKeyError::new("data", "mystery_knob").into();
        assert!(err.to_string().contains("mystery_knob"));
    }

    #[test]
    fn test_validation_error_items() {
        let err = BlueprintValidationError::new("empty component list")
            .with_items(vec!["data".to_string()]);
        assert_eq!(err.items, vec!["data"]);
    }
}
