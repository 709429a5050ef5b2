//! Layered engine settings for Tenantry using Figment
//!
//! Settings control the expression parser limits, an optional template
//! directory and the log filter. Sources merge in this order, later ones
//! winning:
//!
//! 1. Built-in defaults
//! 2. `~/.tenantry/tenantry.{toml,yaml,yml,json}`
//! 3. `./.tenantry/tenantry.{toml,yaml,yml,json}`
//! 4. A file passed explicitly, e.g. `--config`
//! 5. `TENANTRY_*` environment variables (`__` separates nested keys)
//!
//! ```no_run
//! use tenantry_config::SettingsProvider;
//!
//! let settings = SettingsProvider::new().load()?;
//! let limits = settings.formula.limits();
//! # let _ = limits;
//! # Ok::<(), tenantry_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod settings;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery, CONFIG_DIR_NAME};
pub use error::ConfigError;
pub use provider::{SettingsProvider, ENV_PREFIX};
pub use settings::{
    EngineSettings, FormulaSettings, LoggingSettings, TemplateSettings, DEFAULT_LOG_FILTER,
};

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;
