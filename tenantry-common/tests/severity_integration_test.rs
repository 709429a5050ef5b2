//! Integration tests for the Severity trait
//!
//! Exercises the trait the way downstream crates use it: a domain error enum
//! implements `Severity`, and callers pick a reporting strategy from the level.

use tenantry_common::{ErrorSeverity, Severity};

#[derive(Debug)]
enum ConfigurationError {
    InvalidStage(String),
    TemplateNotFound(String),
    UnreadableDocument,
    SkippedFile,
}

impl Severity for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigurationError::InvalidStage(_) | ConfigurationError::TemplateNotFound(_) => {
                ErrorSeverity::Error
            }
            ConfigurationError::UnreadableDocument => ErrorSeverity::Critical,
            ConfigurationError::SkippedFile => ErrorSeverity::Warning,
        }
    }
}

#[test]
fn test_severity_levels_are_distinct() {
    assert_ne!(ErrorSeverity::Warning, ErrorSeverity::Error);
    assert_ne!(ErrorSeverity::Error, ErrorSeverity::Critical);
    assert_ne!(ErrorSeverity::Warning, ErrorSeverity::Critical);
}

#[test]
fn test_domain_errors_classify() {
    let errors = vec![
        ConfigurationError::InvalidStage("won".into()),
        ConfigurationError::TemplateNotFound("retail".into()),
        ConfigurationError::UnreadableDocument,
        ConfigurationError::SkippedFile,
    ];
    let levels: Vec<ErrorSeverity> = errors.iter().map(|e| e.severity()).collect();
    assert_eq!(
        levels,
        vec![
            ErrorSeverity::Error,
            ErrorSeverity::Error,
            ErrorSeverity::Critical,
            ErrorSeverity::Warning,
        ]
    );
}

#[test]
fn test_worst_severity_wins() {
    let errors = [
        ConfigurationError::SkippedFile,
        ConfigurationError::UnreadableDocument,
        ConfigurationError::InvalidStage("x".into()),
    ];
    let worst = errors.iter().map(Severity::severity).max();
    assert_eq!(worst, Some(ErrorSeverity::Critical));
    assert!(errors[1].is_critical());
}
