//! Record validation against an entity type.
//!
//! [`validate_entity`] never fails: every problem, including a broken custom
//! validator, becomes a [`FieldValidationError`] in the returned
//! [`ValidationResult`]. Custom validators compile under the [`Limits`] of
//! the [`Validator`] running them. Each field reports at most one error, checked in
//! this order: required, type, rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tenantry_expr::value::format_number;
use tenantry_expr::{Limits, Program, Scope, Value};
use tracing::debug;

use crate::entity::EntityTypeDef;
use crate::types::{FieldDef, FieldType, ValidationRules};
use crate::Record;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern compiles"));

const MIN_PHONE_LENGTH: usize = 10;

/// One field-level problem, suitable for direct display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub value: Value,
}

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<FieldValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// The error reported for `field`, if any.
    pub fn error_for(&self, field: &str) -> Option<&FieldValidationError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// Validates records against entity types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    /// Compile custom validators under `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Validate `data` against every field of `entity_type`, in field order.
    ///
    /// Keys in `data` that match no field are ignored.
    pub fn validate_entity(&self, entity_type: &EntityTypeDef, data: &Record) -> ValidationResult {
        let errors: Vec<FieldValidationError> = entity_type
            .ordered_fields()
            .into_iter()
            .filter_map(|field| self.validate_field(field, data))
            .collect();
        debug!(
            entity_type = %entity_type.name,
            errors = errors.len(),
            "validated record"
        );
        ValidationResult::from_errors(errors)
    }

    /// Validate a single field of `data`.
    pub fn validate_field(&self, field: &FieldDef, data: &Record) -> Option<FieldValidationError> {
        let value = data.get(&field.name).unwrap_or(&Value::Null);
        let message = if value.is_blank() {
            field.required.then(|| format!("{} is required", field.label))
        } else {
            check_type(field, value).err().or_else(|| {
                field
                    .validation
                    .as_ref()
                    .and_then(|rules| check_rules(field, rules, value, data, &self.limits))
            })
        };
        let message = message?;
        Some(FieldValidationError {
            field: field.name.clone(),
            message,
            value: value.clone(),
        })
    }
}

/// [`Validator::validate_entity`] with default limits.
pub fn validate_entity(entity_type: &EntityTypeDef, data: &Record) -> ValidationResult {
    Validator::default().validate_entity(entity_type, data)
}

/// [`Validator::validate_field`] with default limits.
pub fn validate_field(field: &FieldDef, data: &Record) -> Option<FieldValidationError> {
    Validator::default().validate_field(field, data)
}

/// Intrinsic check for the field's type.
fn check_type(field: &FieldDef, value: &Value) -> Result<(), String> {
    let label = &field.label;
    let text = || value.as_str().ok_or_else(|| format!("{label} must be text"));
    match field.field_type {
        FieldType::Text | FieldType::Richtext | FieldType::Color | FieldType::Barcode | FieldType::Qrcode => {
            text().map(drop)
        }
        FieldType::Email => {
            if EMAIL.is_match(text()?) {
                Ok(())
            } else {
                Err(format!("{label} must be a valid email address"))
            }
        }
        FieldType::Url => match url::Url::parse(text()?) {
            Ok(_) => Ok(()),
            Err(_) => Err(format!("{label} must be a valid URL")),
        },
        FieldType::Phone => {
            let s = text()?;
            if PHONE.is_match(s) && s.chars().count() >= MIN_PHONE_LENGTH {
                Ok(())
            } else {
                Err(format!("{label} must be a valid phone number"))
            }
        }
        FieldType::Number | FieldType::Currency | FieldType::Percentage | FieldType::Rating => value
            .numeric()
            .map(drop)
            .ok_or_else(|| format!("{label} must be a number")),
        FieldType::Date | FieldType::Datetime => value
            .as_date()
            .map(drop)
            .ok_or_else(|| format!("{label} must be a valid date")),
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(()),
            _ => Err(format!("{label} must be true or false")),
        },
        FieldType::Select => match value.as_str() {
            Some(s) if field.has_option(s) => Ok(()),
            _ => Err(format!("{label} must be one of the available options")),
        },
        FieldType::Multiselect => {
            let items = value
                .as_list()
                .ok_or_else(|| format!("{label} must be a list of options"))?;
            let invalid: Vec<String> = items
                .iter()
                .filter(|item| !item.as_str().is_some_and(|s| field.has_option(s)))
                .map(Value::to_display_string)
                .collect();
            if invalid.is_empty() {
                Ok(())
            } else {
                Err(format!("{label} contains invalid options: {}", invalid.join(", ")))
            }
        }
        FieldType::UserReference | FieldType::EntityReference => {
            let valid = match value {
                Value::String(_) => true,
                Value::List(items) => items.iter().all(|item| matches!(item, Value::String(_))),
                _ => false,
            };
            if valid {
                Ok(())
            } else {
                Err(format!("{label} must be a reference id"))
            }
        }
        FieldType::File | FieldType::Image | FieldType::Address => match value {
            Value::String(_) | Value::Map(_) => Ok(()),
            _ => Err(format!("{label} has an invalid value")),
        },
        FieldType::Formula | FieldType::Lookup | FieldType::Rollup => Ok(()),
    }
}

/// Failure from a rule: either a normal rule failure, which the custom
/// message may replace, or a broken rule definition, which it may not.
enum RuleFailure {
    Failed(String),
    Broken,
}

fn check_rules(
    field: &FieldDef,
    rules: &ValidationRules,
    value: &Value,
    data: &Record,
    limits: &Limits,
) -> Option<String> {
    let label = &field.label;
    match first_rule_failure(field, rules, value, data, limits)? {
        RuleFailure::Failed(message) => Some(rules.message.clone().unwrap_or(message)),
        RuleFailure::Broken => Some(format!("{label} has an invalid validator")),
    }
}

fn first_rule_failure(
    field: &FieldDef,
    rules: &ValidationRules,
    value: &Value,
    data: &Record,
    limits: &Limits,
) -> Option<RuleFailure> {
    let label = &field.label;

    if let Some(n) = value.numeric() {
        if let Some(min) = rules.min.filter(|min| n < *min) {
            return Some(RuleFailure::Failed(format!(
                "{label} must be at least {}",
                format_number(min)
            )));
        }
        if let Some(max) = rules.max.filter(|max| n > *max) {
            return Some(RuleFailure::Failed(format!(
                "{label} must be at most {}",
                format_number(max)
            )));
        }
    }

    if let Value::String(s) = value {
        let length = s.chars().count();
        if let Some(min) = rules.min_length.filter(|min| length < *min) {
            return Some(RuleFailure::Failed(format!(
                "{label} must be at least {min} characters"
            )));
        }
        if let Some(max) = rules.max_length.filter(|max| length > *max) {
            return Some(RuleFailure::Failed(format!(
                "{label} must be at most {max} characters"
            )));
        }
    }

    if let Some(pattern) = &rules.pattern {
        let subject = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) => Some(value.to_display_string()),
            _ => None,
        };
        if let Some(subject) = subject {
            match Regex::new(pattern) {
                Ok(re) if re.is_match(&subject) => {}
                Ok(_) => return Some(RuleFailure::Failed(format!("{label} has an invalid format"))),
                Err(e) => {
                    debug!(field = %field.name, error = %e, "invalid validation pattern");
                    return Some(RuleFailure::Broken);
                }
            }
        }
    }

    if let Some(source) = &rules.custom_validator {
        return run_custom_validator(field, source, value, data, limits);
    }
    None
}

/// Run a custom validator expression with `value`, `field` and `data` bound.
fn run_custom_validator(
    field: &FieldDef,
    source: &str,
    value: &Value,
    data: &Record,
    limits: &Limits,
) -> Option<RuleFailure> {
    let scope = Scope::new()
        .with("value", value.clone())
        .with("field", field.to_value())
        .with("data", Value::Map(data.clone()));
    let result = Program::compile_with_limits(source, limits).and_then(|program| program.execute(&scope));
    match result {
        Ok(Value::Bool(true)) => None,
        Ok(Value::String(message)) => Some(RuleFailure::Failed(message)),
        Ok(_) => Some(RuleFailure::Failed(format!("{} is invalid", field.label))),
        Err(e) => {
            debug!(field = %field.name, error = %e, "custom validator failed");
            Some(RuleFailure::Broken)
        }
    }
}
