//! Tenantry command-line interface.
//!
//! The binary is a thin shell over [`run`]: parse arguments, load settings,
//! install logging, then dispatch. Command output goes to stdout; logs and
//! errors go to stderr.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: The record failed validation

pub mod cli;
pub mod logging;
pub mod records;
pub mod templates;

use std::io::Write;

use anyhow::Result;
use tenantry_common::{ErrorSeverity, Severity};
use tenantry_config::{ConfigError, EngineSettings, SettingsProvider};
use tenantry_expr::ExprError;
use tenantry_fields::{FieldsError, FormulaError};
use tenantry_workspace::{TemplateCatalog, WorkspaceConfigService, WorkspaceError};
use tracing::debug;

pub use cli::{Cli, Commands, SchemaArgs, TemplateCommands};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
/// Exit code returned when a record fails validation.
pub const EXIT_INVALID_RECORD: i32 = 2;

/// Severity of the first engine error in `err`'s chain. Anything else, such
/// as an unreadable record file, counts as [`ErrorSeverity::Error`].
pub fn severity_of(err: &anyhow::Error) -> ErrorSeverity {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<WorkspaceError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<FieldsError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<FormulaError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<ExprError>() {
            return e.severity();
        }
    }
    ErrorSeverity::Error
}

/// The line printed to stderr for a failed command, prefixed with its severity.
pub fn failure_message(err: &anyhow::Error) -> String {
    format!("{}: {err:#}", severity_of(err))
}

/// Load settings from the standard locations plus `--config`.
pub fn load_settings(cli: &Cli) -> Result<EngineSettings> {
    let provider = match &cli.config {
        Some(path) => SettingsProvider::new().with_file(path),
        None => SettingsProvider::new(),
    };
    Ok(provider.load()?)
}

/// Built-in templates plus the configured template directory, if any.
pub async fn load_catalog(settings: &EngineSettings) -> Result<TemplateCatalog> {
    let mut catalog = TemplateCatalog::builtin();
    if let Some(dir) = &settings.templates.directory {
        let loaded = catalog.load_dir(dir).await?;
        debug!(directory = %dir.display(), loaded, "loaded template directory");
    }
    Ok(catalog)
}

/// Execute `command`, writing its output to `out`. Returns the exit code.
pub async fn run(command: Commands, settings: &EngineSettings, out: &mut impl Write) -> Result<i32> {
    match command {
        Commands::Templates { command } => {
            let catalog = load_catalog(settings).await?;
            match command {
                TemplateCommands::List { json } => templates::run_list(&catalog, json, out)?,
                TemplateCommands::Show { id } => templates::run_show(&catalog, &id, out)?,
            }
            Ok(EXIT_SUCCESS)
        }
        Commands::Defaults { workspace_id } => {
            let config = WorkspaceConfigService::new().default_configuration(&workspace_id);
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Validate { schema, record } => {
            records::run_validate(&schema, &record, &settings.formula, out)
        }
        Commands::Prepare { schema, record } => {
            records::run_prepare(&schema, &record, &settings.formula, out).await
        }
        Commands::Formula {
            schema,
            expression,
            record,
        } => records::run_formula(&schema, &expression, &record, &settings.formula, out).await,
    }
}
