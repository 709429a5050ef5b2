//! Engine settings types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tenantry_expr::{Limits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_BYTES};

use crate::error::ConfigError;
use crate::ConfigResult;

/// Log filter used when neither settings nor `RUST_LOG` provide one.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Complete engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub formula: FormulaSettings,
    pub templates: TemplateSettings,
    pub logging: LoggingSettings,
}

/// Expression parser limits for formulas and custom validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaSettings {
    pub max_input_bytes: usize,
    pub max_depth: usize,
}

impl Default for FormulaSettings {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FormulaSettings {
    pub fn limits(&self) -> Limits {
        Limits {
            max_input_bytes: self.max_input_bytes,
            max_depth: self.max_depth,
        }
    }
}

/// Where to find additional workspace templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory of `*.yaml`, `*.yml` and `*.json` templates merged over the
    /// built-in catalog.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: Option<String>,
}

impl LoggingSettings {
    pub fn filter_or_default(&self) -> &str {
        self.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

impl EngineSettings {
    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.formula.max_input_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "formula.max_input_bytes",
                "must be at least 1",
            ));
        }
        if self.formula.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "formula.max_depth",
                "must be at least 1",
            ));
        }
        if self.logging.filter.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(ConfigError::invalid_value("logging.filter", "cannot be empty"));
        }
        Ok(())
    }
}
