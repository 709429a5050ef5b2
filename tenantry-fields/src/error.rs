//! Error types for entity type definitions

use tenantry_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Structural errors in a field or entity type definition.
///
/// These describe schema mistakes made by whoever authored the entity type,
/// not problems with record data. Record problems are reported as
/// [`crate::FieldValidationError`] values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldsError {
    /// Field not found by name
    #[error("field not found: {entity_type}.{name}")]
    FieldNotFound { entity_type: String, name: String },

    /// Duplicate field name
    #[error("duplicate field name: {entity_type}.{name}")]
    DuplicateFieldName { entity_type: String, name: String },

    #[error("field '{field}' has duplicate option value '{value}'")]
    DuplicateOption { field: String, value: String },

    /// Options declared on a field that is not select or multiselect
    #[error("field '{field}' of type {field_type} cannot declare options")]
    OptionsNotAllowed { field: String, field_type: String },

    /// Formula declared on a field that is not a formula field
    #[error("field '{field}' of type {field_type} cannot declare a formula")]
    FormulaNotAllowed { field: String, field_type: String },

    /// A searchable or summary list names a field that does not exist
    #[error("{list} of '{entity_type}' references unknown field '{name}'")]
    UnknownFieldReference {
        entity_type: String,
        list: &'static str,
        name: String,
    },

    #[error("entity type '{entity_type}' enables a pipeline but defines no stages")]
    EmptyPipeline { entity_type: String },

    #[error("entity type '{entity_type}' has duplicate pipeline stage '{id}'")]
    DuplicateStage { entity_type: String, id: String },

    #[error("pipeline stage '{stage}' has probability {probability}, expected 0-100")]
    InvalidProbability { stage: String, probability: u8 },

    /// Empty identifier
    #[error("{what} name cannot be empty")]
    EmptyName { what: &'static str },
}

impl Severity for FieldsError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::FieldNotFound {
            entity_type: "contact".into(),
            name: "status".into(),
        };
        assert_eq!(err.to_string(), "field not found: contact.status");
    }

    #[test]
    fn test_unknown_reference_display() {
        let err = FieldsError::UnknownFieldReference {
            entity_type: "deal".into(),
            list: "searchableFields",
            name: "title".into(),
        };
        assert!(err.to_string().contains("searchableFields"));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_severity() {
        let err = FieldsError::EmptyPipeline {
            entity_type: "deal".into(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert!(!err.is_critical());
    }
}
