//! Formula field evaluation.
//!
//! A formula is an expression string whose `{field_name}` placeholders are
//! replaced with the JSON text of the record's current values before it is
//! parsed. Placeholders for fields the record does not contain are left in
//! place and normally make the expression fail to parse.

use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use tenantry_common::{ErrorSeverity, Pretty, Severity};
use tenantry_expr::{ExprError, Limits, Program, Scope, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entity::EntityTypeDef;
use crate::types::FieldType;
use crate::Record;

/// A formula failed to parse or evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("formula `{expression}` failed: {source}")]
pub struct FormulaError {
    /// The expression after placeholder substitution.
    pub expression: String,
    #[source]
    pub source: ExprError,
}

impl Severity for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }
}

/// Evaluates formulas under fixed parser limits and an optional pinned clock.
#[derive(Debug, Clone, Default)]
pub struct FormulaEngine {
    limits: Limits,
    now: Option<DateTime<Utc>>,
}

impl FormulaEngine {
    pub fn new(limits: Limits) -> Self {
        Self { limits, now: None }
    }

    /// Pin the time seen by `TODAY()` and `Date.now()`.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Substitute placeholders from `data` and evaluate the result.
    pub async fn evaluate(
        &self,
        formula: &str,
        data: &Record,
        entity_type: &EntityTypeDef,
    ) -> Result<Value, FormulaError> {
        let expression = substitute_placeholders(formula, data, entity_type);
        let scope = match self.now {
            Some(now) => Scope::new().with_clock(now),
            None => Scope::new(),
        };
        Program::compile_with_limits(&expression, &self.limits)
            .and_then(|program| program.execute(&scope))
            .map_err(|source| FormulaError { expression, source })
    }

    /// Recompute every formula field in field order.
    ///
    /// Each formula sees the values computed before it. A failing formula
    /// sets its field to null and does not stop the others.
    pub async fn calculate(&self, entity_type: &EntityTypeDef, data: &Record) -> Record {
        let mut out = data.clone();
        for field in entity_type.ordered_fields() {
            if field.field_type != FieldType::Formula {
                continue;
            }
            let Some(formula) = &field.formula else {
                continue;
            };
            let value = match self.evaluate(formula, &out, entity_type).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        entity_type = %entity_type.name,
                        field = %field.name,
                        error = %e,
                        "formula evaluation failed"
                    );
                    Value::Null
                }
            };
            out.insert(field.name.clone(), value);
        }
        debug!(entity_type = %entity_type.name, record = %Pretty(&out), "calculated formulas");
        out
    }
}

/// Replace `{name}` with the JSON text of `data[name]` for every field of
/// `entity_type` present in `data`.
pub fn substitute_placeholders(formula: &str, data: &Record, entity_type: &EntityTypeDef) -> String {
    let mut expression = formula.to_string();
    for name in entity_type.field_names() {
        let Some(value) = data.get(name) else {
            continue;
        };
        let pattern = format!(r"\{{{}\}}", regex::escape(name));
        match Regex::new(&pattern) {
            Ok(re) => {
                let json = value.to_json_string();
                expression = re.replace_all(&expression, NoExpand(&json)).into_owned();
            }
            Err(e) => debug!(field = name, error = %e, "skipping placeholder"),
        }
    }
    expression
}

/// [`FormulaEngine::evaluate`] with default limits.
pub async fn evaluate_formula(
    formula: &str,
    data: &Record,
    entity_type: &EntityTypeDef,
) -> Result<Value, FormulaError> {
    FormulaEngine::default()
        .evaluate(formula, data, entity_type)
        .await
}

/// [`FormulaEngine::calculate`] with default limits.
pub async fn calculate_formulas(entity_type: &EntityTypeDef, data: &Record) -> Record {
    FormulaEngine::default().calculate(entity_type, data).await
}
