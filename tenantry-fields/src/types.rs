//! Core field types.
//!
//! All types serialize to/from JSON and YAML via serde with camelCase keys.
//! A field definition describes one named, typed attribute of an entity type.

use std::fmt;

use serde::{Deserialize, Serialize};
use tenantry_expr::Value;

/// The closed set of field types.
///
/// Each variant has a fixed intrinsic validation rule; see
/// [`crate::validation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Number,
    Currency,
    Percentage,
    Date,
    Datetime,
    Boolean,
    Select,
    Multiselect,
    UserReference,
    EntityReference,
    File,
    Image,
    Url,
    Email,
    Phone,
    Address,
    Richtext,
    Formula,
    Lookup,
    Rollup,
    Barcode,
    Qrcode,
    Rating,
    Color,
}

impl FieldType {
    pub const ALL: [FieldType; 25] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Currency,
        FieldType::Percentage,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Boolean,
        FieldType::Select,
        FieldType::Multiselect,
        FieldType::UserReference,
        FieldType::EntityReference,
        FieldType::File,
        FieldType::Image,
        FieldType::Url,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Address,
        FieldType::Richtext,
        FieldType::Formula,
        FieldType::Lookup,
        FieldType::Rollup,
        FieldType::Barcode,
        FieldType::Qrcode,
        FieldType::Rating,
        FieldType::Color,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::UserReference => "user-reference",
            FieldType::EntityReference => "entity-reference",
            FieldType::File => "file",
            FieldType::Image => "image",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Address => "address",
            FieldType::Richtext => "richtext",
            FieldType::Formula => "formula",
            FieldType::Lookup => "lookup",
            FieldType::Rollup => "rollup",
            FieldType::Barcode => "barcode",
            FieldType::Qrcode => "qrcode",
            FieldType::Rating => "rating",
            FieldType::Color => "color",
        }
    }

    /// Values derived from other data rather than entered.
    pub fn is_computed(self) -> bool {
        matches!(self, FieldType::Formula | FieldType::Lookup | FieldType::Rollup)
    }

    /// Types that carry an `options` list.
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldType::Number | FieldType::Currency | FieldType::Percentage | FieldType::Rating
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single option in a select or multiselect field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            color: None,
            icon: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Optional per-field validation rules, checked after the type check passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Expression evaluated with `value`, `field` and `data` bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator: Option<String>,
    /// Replaces the default message of any failing rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRules {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Layout width hint for forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    Full,
    Half,
    Third,
}

/// A field definition: the complete schema for a single named attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<FieldWidth>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Target entity type for `entity-reference` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_entity_type: Option<String>,
}

impl FieldDef {
    /// A field with `id == name` and no rules.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            label: label.into(),
            field_type,
            required: false,
            default_value: None,
            options: Vec::new(),
            validation: None,
            formula: None,
            order: 0,
            placeholder: None,
            help_text: None,
            width: None,
            hidden: false,
            read_only: false,
            reference_entity_type: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = SelectOption>,
    {
        self.options = options.into_iter().collect();
        self
    }

    pub fn validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn references(mut self, entity_type: impl Into<String>) -> Self {
        self.reference_entity_type = Some(entity_type.into());
        self
    }

    pub fn width(mut self, width: FieldWidth) -> Self {
        self.width = Some(width);
        self
    }

    /// Whether `value` is one of this field's option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Serialize into a [`Value::Map`] for expression scopes.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).map_or(Value::Null, Value::from)
    }
}
