//! Error types for the workflow layer

use crate::{RecordId, RecordKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field-level validation failures: every violated rule, not just the
/// first, keyed by wire field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. The first message for a field wins; later rules
    /// on the same field do not overwrite it.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold another error set in; existing messages win on collision.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.errors {
            self.errors.entry(field).or_insert(message);
        }
    }

    /// Human-readable one-line summary of every violation.
    pub fn summary(&self) -> String {
        self.errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Errors that can occur in workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("action forbidden: {0}")]
    Forbidden(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("unsaved edits pending; save or discard them before this action")]
    StaleEdit,

    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unknown status code {code} for {kind}")]
    UnknownStatus { kind: RecordKind, code: u8 },

    #[error("unknown occurrence type code: {0}")]
    UnknownDiscriminator(u8),
}

impl WorkflowError {
    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collect_everything() {
        let mut errors = FieldErrors::new();
        errors.push("location", "location is required");
        errors.push("ro_city", "city is required");
        errors.push("location", "overwritten?");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message_for("location"), Some("location is required"));
        assert!(errors.summary().contains("city is required"));
    }

    #[test]
    fn test_single_field_constructor() {
        let err = WorkflowError::field("deviation_realized", "deviation description is required");
        match err {
            WorkflowError::Validation(errors) => {
                assert!(errors.contains("deviation_realized"));
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
