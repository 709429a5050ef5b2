//! Error types for expression parsing and evaluation

use tenantry_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for expression operations
pub type Result<T> = std::result::Result<T, ExprError>;

/// Errors raised while compiling or evaluating an expression.
///
/// Parse errors carry the byte offset into the source text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// Input was empty or contained only whitespace.
    #[error("expression is empty")]
    EmptyInput,

    /// Input exceeded the configured size limit.
    #[error("expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        max_bytes: usize,
        actual_bytes: usize,
    },

    /// Input exceeded the configured nesting depth.
    #[error("expression nesting exceeds limit of {max_depth} at {position}")]
    NestingTooDeep { max_depth: usize, position: usize },

    #[error("unexpected token `{found}` at {position}, expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: usize },

    #[error("invalid escape sequence at {position}")]
    InvalidEscape { position: usize },

    #[error("invalid number `{raw}` at {position}")]
    InvalidNumber { raw: String, position: usize },

    /// Unexpected input after a complete expression.
    #[error("unexpected trailing input at {position}")]
    TrailingInput { position: usize },

    /// Identifier not bound in the evaluation scope.
    #[error("{name} is not defined")]
    UnknownIdentifier { name: String },

    #[error("{name} is not a function")]
    NotCallable { name: String },

    /// Operation applied to a value of the wrong type.
    #[error("type error: {message}")]
    Type { message: String },

    /// Built-in function called with bad arguments.
    #[error("{function}: {message}")]
    Argument { function: String, message: String },
}

impl ExprError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    pub fn argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            function: function.into(),
            message: message.into(),
        }
    }

    /// True for errors raised before evaluation started.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::InputTooLarge { .. }
                | Self::NestingTooDeep { .. }
                | Self::UnexpectedToken { .. }
                | Self::UnterminatedString { .. }
                | Self::InvalidEscape { .. }
                | Self::InvalidNumber { .. }
                | Self::TrailingInput { .. }
        )
    }
}

impl Severity for ExprError {
    fn severity(&self) -> ErrorSeverity {
        // Formula and validator failures are downgraded per field by callers.
        ErrorSeverity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExprError::UnexpectedToken {
            expected: "`)`",
            found: ",".into(),
            position: 7,
        };
        assert_eq!(err.to_string(), "unexpected token `,` at 7, expected `)`");
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(ExprError::EmptyInput.is_parse_error());
        assert!(ExprError::TrailingInput { position: 3 }.is_parse_error());
        assert!(!ExprError::type_error("bad").is_parse_error());
        assert!(!ExprError::UnknownIdentifier { name: "x".into() }.is_parse_error());
    }

    #[test]
    fn test_severity_is_warning() {
        assert_eq!(
            ExprError::argument("AVG", "needs at least one value").severity(),
            ErrorSeverity::Warning
        );
    }
}
