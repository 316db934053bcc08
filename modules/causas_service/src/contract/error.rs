//! Contract error types for the causas service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use std::collections::BTreeMap;
use std::fmt;

/// Message used for a missing required field
pub const REQUIRED: &str = "Este campo es obligatorio.";

/// Field-level validation messages, keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), CausasError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CausasError::Validation { errors: self })
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Causas service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CausasError {
    /// Submitted values violate field constraints; nothing was persisted
    #[error("Validation error: {errors}")]
    Validation { errors: FieldErrors },

    /// Referenced record does not exist
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Uniqueness conflict
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Delete rejected because other rows still reference the record
    #[error("{resource} {id} is still referenced by {referenced_by}")]
    Protected {
        resource: String,
        id: String,
        referenced_by: String,
    },

    /// No authenticated principal
    #[error("Authentication required")]
    Unauthenticated,

    /// Internal error
    #[error("Internal error")]
    Internal,
}

impl CausasError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn protected(resource: &str, id: impl fmt::Display, referenced_by: &str) -> Self {
        Self::Protected {
            resource: resource.to_string(),
            id: id.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: FieldErrors::single(field, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("rol", REQUIRED);
        errors.add("rol", "Asegúrese de que este valor tenga a lo más 50 caracteres.");
        errors.add("deudor", REQUIRED);

        assert_eq!(errors.get("rol").map(<[String]>::len), Some(2));
        assert!(errors.contains("deudor"));
        assert!(!errors.contains("estado"));
        assert!(matches!(
            errors.into_result(),
            Err(CausasError::Validation { .. })
        ));
    }

    #[test]
    fn test_empty_field_errors_is_ok() {
        assert_eq!(FieldErrors::new().into_result(), Ok(()));
    }
}
