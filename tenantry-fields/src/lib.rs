//! Entity type schemas and record processing
//!
//! `tenantry-fields` owns the schema side of Tenantry: the closed set of
//! field types, field and entity type definitions with their pipelines, and
//! the pure operations that run records through a schema.
//!
//! # Architecture
//!
//! - **Schema types**: [`FieldDef`], [`EntityTypeDef`], [`PipelineStage`], serialized with camelCase keys
//! - **Validation**: [`Validator`] and [`validate_entity`] report field errors as data, never as `Err`
//! - **Defaults**: [`apply_defaults`] fills absent keys, idempotently
//! - **Formulas**: [`FormulaEngine`] substitutes `{field}` placeholders and evaluates with `tenantry-expr`
//!
//! Records are plain [`Record`] maps. Keys with no matching field pass
//! through every operation untouched.

pub mod defaults;
pub mod entity;
pub mod error;
pub mod formula;
pub mod types;
pub mod validation;

pub use defaults::apply_defaults;
pub use entity::{DefaultView, EntityTypeDef, PipelineStage, StageAutomation};
pub use error::{FieldsError, Result};
pub use formula::{calculate_formulas, evaluate_formula, FormulaEngine, FormulaError};
pub use types::{FieldDef, FieldType, FieldWidth, SelectOption, ValidationRules};
pub use validation::{
    validate_entity, validate_field, FieldValidationError, ValidationResult, Validator,
};

/// A record's field values, keyed by field name in insertion order.
pub type Record = tenantry_expr::Map;
