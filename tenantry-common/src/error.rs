//! Error severity classification shared across Tenantry crates
//!
//! Every crate defines its own `thiserror` enum. Implementing [`Severity`]
//! for it lets callers (the CLI, UI adapters) decide how loudly to report a
//! failure without matching on crate-specific variants.

/// Severity levels for error classification
///
/// - **Warning**: Potential issue but the operation can proceed.
/// - **Error**: The operation failed but the engine remains usable. Misuse of
///   the API (moving a record to an unknown stage, applying an unknown
///   template) lands here.
/// - **Critical**: The engine cannot continue with the current input, e.g. a
///   workspace document or template that cannot be read at all.
///
/// # Examples
///
/// ```rust
/// use tenantry_common::ErrorSeverity;
///
/// let skipped_template_file = ErrorSeverity::Warning;
/// let unknown_stage = ErrorSeverity::Error;
/// let unreadable_config = ErrorSeverity::Critical;
/// assert_ne!(skipped_template_file, unreadable_config);
/// # let _ = unknown_stage;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,

    /// Operation failed but system can continue
    Error,

    /// System cannot continue with this input
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
///
/// # Example
///
/// ```rust
/// use tenantry_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum StageError {
///     UnknownStage,
///     StoreUnavailable,
/// }
///
/// impl Severity for StageError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             StageError::UnknownStage => ErrorSeverity::Error,
///             StageError::StoreUnavailable => ErrorSeverity::Critical,
///         }
///     }
/// }
///
/// assert_eq!(StageError::UnknownStage.severity(), ErrorSeverity::Error);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;

    /// Whether the error should be surfaced as a blocking failure.
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ErrorSeverity);

    impl Severity for Fixed {
        fn severity(&self) -> ErrorSeverity {
            self.0
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn is_critical_defaults_from_severity() {
        assert!(Fixed(ErrorSeverity::Critical).is_critical());
        assert!(!Fixed(ErrorSeverity::Error).is_critical());
        assert!(!Fixed(ErrorSeverity::Warning).is_critical());
    }

    #[test]
    fn severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }
}
