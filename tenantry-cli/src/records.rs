//! `tenantry validate`, `prepare` and `formula` - run a record file through
//! an entity type read from a schema file.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tenantry_config::FormulaSettings;
use tenantry_fields::{EntityTypeDef, FormulaEngine, Record, Validator};
use tenantry_workspace::{EntityTypeService, MemoryEntityStore, WorkspaceError};
use tracing::debug;

use crate::cli::SchemaArgs;
use crate::{EXIT_INVALID_RECORD, EXIT_SUCCESS};

/// The part of a workspace configuration or template the CLI needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaFile {
    entity_types: Vec<EntityTypeDef>,
}

/// Read a JSON or YAML file, choosing the format by extension.
fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let parsed = if is_yaml {
        serde_yaml_ng::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

/// Load and check the entity type named in `args`.
pub fn load_entity_type(args: &SchemaArgs) -> Result<EntityTypeDef> {
    let schema: SchemaFile = read_file(&args.schema)?;
    let entity_type = schema
        .entity_types
        .into_iter()
        .find(|et| et.name == args.entity_type)
        .with_context(|| {
            format!(
                "entity type '{}' not found in {}",
                args.entity_type,
                args.schema.display()
            )
        })?;
    entity_type.check()?;
    debug!(entity_type = %entity_type.name, "loaded entity type");
    Ok(entity_type)
}

pub fn load_record(path: &Path) -> Result<Record> {
    read_file(path)
}

/// Print the validation result. Exit code 2 when the record is invalid.
pub fn run_validate(
    args: &SchemaArgs,
    record: &Path,
    formula: &FormulaSettings,
    out: &mut impl Write,
) -> Result<i32> {
    let entity_type = load_entity_type(args)?;
    let data = load_record(record)?;
    let result = Validator::new(formula.limits()).validate_entity(&entity_type, &data);
    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    Ok(if result.valid {
        EXIT_SUCCESS
    } else {
        EXIT_INVALID_RECORD
    })
}

/// Print the prepared record, or the validation errors with exit code 2.
pub async fn run_prepare(
    args: &SchemaArgs,
    record: &Path,
    formula: &FormulaSettings,
    out: &mut impl Write,
) -> Result<i32> {
    let entity_type = load_entity_type(args)?;
    let data = load_record(record)?;
    let service = EntityTypeService::new(Arc::new(MemoryEntityStore::new()))
        .with_limits(formula.limits());
    match service.prepare_record(&entity_type, &data).await {
        Ok(prepared) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&prepared)?)?;
            Ok(EXIT_SUCCESS)
        }
        Err(WorkspaceError::Validation { errors }) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&errors)?)?;
            Ok(EXIT_INVALID_RECORD)
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the formula's value as JSON.
pub async fn run_formula(
    args: &SchemaArgs,
    expression: &str,
    record: &Path,
    formula: &FormulaSettings,
    out: &mut impl Write,
) -> Result<i32> {
    let entity_type = load_entity_type(args)?;
    let data = load_record(record)?;
    let value = FormulaEngine::new(formula.limits())
        .evaluate(expression, &data, &entity_type)
        .await?;
    writeln!(out, "{}", serde_json::to_string(&value)?)?;
    Ok(EXIT_SUCCESS)
}
