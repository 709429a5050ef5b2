//! Logging utilities for Tenantry
//!
//! This module provides utilities for formatting and displaying log messages.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing types in logs as YAML
///
/// Use this in tracing statements to render schemas, records and patches
/// as YAML with a newline before the content:
///
/// ```ignore
/// use tenantry_common::Pretty;
/// use tracing::debug;
///
/// debug!("applied template: {}", Pretty(&config.navigation));
/// ```
///
/// Debug is used as a fallback if YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct Stage {
        id: String,
        probability: u8,
    }

    #[test]
    fn pretty_renders_yaml_with_leading_newline() {
        let stage = Stage {
            id: "negotiation".into(),
            probability: 75,
        };
        let rendered = format!("{}", Pretty(&stage));
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("id: negotiation"));
        assert!(rendered.contains("probability: 75"));
    }

    #[test]
    fn pretty_debug_matches_display() {
        let value = vec!["a", "b"];
        assert_eq!(format!("{:?}", Pretty(&value)), format!("{}", Pretty(&value)));
    }
}
