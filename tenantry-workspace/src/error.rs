//! Error types for workspace configuration and entity services

use std::path::PathBuf;

use tenantry_common::{ErrorSeverity, Severity};
use tenantry_fields::{FieldValidationError, FieldsError};
use thiserror::Error;

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Errors that can occur in workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Stage move on an entity type without a pipeline
    #[error("entity type '{entity_type}' does not have a pipeline")]
    PipelineNotSupported { entity_type: String },

    /// Stage id not defined on the entity type
    #[error("invalid stage '{stage}' for entity type '{entity_type}'")]
    InvalidStage { entity_type: String, stage: String },

    #[error("template not found: {id}")]
    TemplateNotFound { id: String },

    #[error("entity type not found: {name}")]
    EntityTypeNotFound { name: String },

    #[error("navigation item not found: {id}")]
    NavigationItemNotFound { id: String },

    #[error("entity type already exists: {name}")]
    DuplicateEntityType { name: String },

    #[error("navigation item already exists: {id}")]
    DuplicateNavigationItem { id: String },

    #[error("view already exists: {id}")]
    DuplicateView { id: String },

    /// The configuration version cannot be bumped any further
    #[error("configuration version of workspace '{workspace_id}' is exhausted")]
    VersionExhausted { workspace_id: String },

    /// No navigation order is left above the highest existing one
    #[error("no navigation order left after {order}")]
    NavigationOrderExhausted { order: i32 },

    /// Record rejected by its entity type
    #[error("record failed validation with {} error(s)", errors.len())]
    Validation { errors: Vec<FieldValidationError> },

    /// Failure reported by an entity store
    #[error("store error: {message}")]
    Store { message: String },

    /// Schema invariant violated
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// IO error, with the path involved
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Field errors when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[FieldValidationError]> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

impl Severity for WorkspaceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Warning,
            Self::Store { .. } | Self::Io { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
