//! Field-level validation for single-record forms (the invoice header).
//!
//! Errors carry the field key, a readable message and an optional hint so
//! they can be shown next to the offending input.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::format::parse_number;

/// Validation error with a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
            .with_suggestion(format!("Fill in the {}", label.to_lowercase()))
    }

    pub fn invalid_number(field: &str, label: &str, value: &str) -> Self {
        Self::new(field, format!("{} '{}' is not a number", label, value))
            .with_suggestion("Use digits with an optional decimal point, e.g. 1500.00")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Numbered, multi-line summary for notifications.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} problem(s) found",
            self.errors.len()
        )];

        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.join("\n")
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate an optional numeric value; blank is accepted.
pub fn validate_number_optional(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }

    if parse_number(trimmed).is_none() {
        errors.add(ValidationError::invalid_number(field, label, trimmed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_flags_whitespace() {
        let mut errors = ValidationErrors::new();
        validate_required("   ", "client_name", "Client Name", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.to_message().contains("Client Name is required"));
    }

    #[test]
    fn optional_number_accepts_blank_rejects_garbage() {
        let mut errors = ValidationErrors::new();
        validate_number_optional("", "price", "Price", &mut errors);
        validate_number_optional("12.5", "price", "Price", &mut errors);
        assert!(errors.is_empty());

        validate_number_optional(".", "price", "Price", &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn message_is_numbered() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("a", "A"));
        errors.add(ValidationError::empty_field("b", "B"));
        let message = errors.to_message();
        assert!(message.contains("2 problem(s)"));
        assert!(message.contains("1. [a] A is required"));
        assert!(message.contains("2. [b] B is required"));
    }
}
