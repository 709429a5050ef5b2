//! Entity type definitions and pipeline stages.
//!
//! An [`EntityTypeDef`] is the tenant-authored schema for one kind of record.
//! Field mutations keep the searchable and summary lists consistent with the
//! field list; [`EntityTypeDef::check`] verifies the remaining invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tenantry_expr::Value;

use crate::error::{FieldsError, Result};
use crate::types::{FieldDef, FieldType};

/// Preferred way to display records of an entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    #[default]
    Table,
    Kanban,
    Gallery,
    Calendar,
    Timeline,
    List,
}

/// Declarative stage-transition automation. Carried, never executed here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageAutomation {
    pub trigger: String,
    #[serde(default)]
    pub actions: Vec<Value>,
}

/// A named step in a sales or process funnel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i32,
    /// Win probability in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub automations: Vec<StageAutomation>,
}

impl PipelineStage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            order,
            probability: None,
            automations: Vec::new(),
        }
    }

    pub fn probability(mut self, probability: u8) -> Self {
        self.probability = Some(probability);
        self
    }
}

/// A tenant-defined record schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeDef {
    pub id: String,
    pub name: String,
    pub label: String,
    pub plural_label: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub searchable_fields: Vec<String>,
    #[serde(default)]
    pub summary_fields: Vec<String>,
    #[serde(default)]
    pub default_view: DefaultView,
    #[serde(default)]
    pub enable_pipeline: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline_stages: Vec<PipelineStage>,
    #[serde(default)]
    pub enable_activities: bool,
    #[serde(default)]
    pub enable_attachments: bool,
    #[serde(default)]
    pub enable_comments: bool,
}

impl EntityTypeDef {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        plural_label: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            label: label.into(),
            plural_label: plural_label.into(),
            icon: icon.into(),
            description: None,
            color: None,
            fields: Vec::new(),
            searchable_fields: Vec::new(),
            summary_fields: Vec::new(),
            default_view: DefaultView::Table,
            enable_pipeline: false,
            pipeline_stages: Vec::new(),
            enable_activities: false,
            enable_attachments: false,
            enable_comments: false,
        }
    }

    /// Append a field, assigning `order` from its position when unset.
    pub fn field(mut self, mut field: FieldDef) -> Self {
        if field.order == 0 {
            field.order = self.next_field_order();
        }
        self.fields.push(field);
        self
    }

    pub fn searchable(mut self, names: &[&str]) -> Self {
        self.searchable_fields = names.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn summary(mut self, names: &[&str]) -> Self {
        self.summary_fields = names.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn view(mut self, view: DefaultView) -> Self {
        self.default_view = view;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Enable the pipeline with the given stages.
    pub fn pipeline<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = PipelineStage>,
    {
        self.enable_pipeline = true;
        self.pipeline_stages = stages.into_iter().collect();
        self
    }

    /// Turn on activities, attachments and comments.
    pub fn collaborative(mut self) -> Self {
        self.enable_activities = true;
        self.enable_attachments = true;
        self.enable_comments = true;
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields sorted by `order`; ties keep declaration order.
    pub fn ordered_fields(&self) -> Vec<&FieldDef> {
        let mut fields: Vec<&FieldDef> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn stage(&self, id: &str) -> Option<&PipelineStage> {
        self.pipeline_stages.iter().find(|s| s.id == id)
    }

    /// Add a field. Fails if the name is already taken. An unset `order`
    /// places the field after every existing one.
    pub fn add_field(&mut self, mut field: FieldDef) -> Result<()> {
        if field.name.trim().is_empty() {
            return Err(FieldsError::EmptyName { what: "field" });
        }
        if self.get_field(&field.name).is_some() {
            return Err(self.duplicate(&field.name));
        }
        if field.order == 0 {
            field.order = self.next_field_order();
        }
        self.fields.push(field);
        Ok(())
    }

    fn next_field_order(&self) -> i32 {
        self.fields
            .iter()
            .map(|f| f.order)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Replace the field called `name`. Renames propagate to the searchable
    /// and summary lists.
    pub fn update_field(&mut self, name: &str, field: FieldDef) -> Result<()> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| self.not_found(name))?;
        if field.name != name {
            if field.name.trim().is_empty() {
                return Err(FieldsError::EmptyName { what: "field" });
            }
            if self.get_field(&field.name).is_some() {
                return Err(self.duplicate(&field.name));
            }
            for list in [&mut self.searchable_fields, &mut self.summary_fields] {
                for entry in list.iter_mut().filter(|entry| entry.as_str() == name) {
                    entry.clone_from(&field.name);
                }
            }
        }
        self.fields[index] = field;
        Ok(())
    }

    /// Remove a field and every reference to it from the searchable and
    /// summary lists.
    pub fn remove_field(&mut self, name: &str) -> Result<FieldDef> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| self.not_found(name))?;
        self.searchable_fields.retain(|n| n != name);
        self.summary_fields.retain(|n| n != name);
        Ok(self.fields.remove(index))
    }

    /// Verify structural invariants, reporting the first violation.
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FieldsError::EmptyName { what: "entity type" });
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(FieldsError::EmptyName { what: "field" });
            }
            if !names.insert(field.name.as_str()) {
                return Err(self.duplicate(&field.name));
            }
            check_field(field)?;
        }

        for (list, entries) in [
            ("searchableFields", &self.searchable_fields),
            ("summaryFields", &self.summary_fields),
        ] {
            if let Some(missing) = entries.iter().find(|n| !names.contains(n.as_str())) {
                return Err(FieldsError::UnknownFieldReference {
                    entity_type: self.name.clone(),
                    list,
                    name: missing.clone(),
                });
            }
        }

        if self.enable_pipeline && self.pipeline_stages.is_empty() {
            return Err(FieldsError::EmptyPipeline {
                entity_type: self.name.clone(),
            });
        }
        let mut stage_ids = HashSet::new();
        for stage in &self.pipeline_stages {
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(FieldsError::DuplicateStage {
                    entity_type: self.name.clone(),
                    id: stage.id.clone(),
                });
            }
            if let Some(probability) = stage.probability.filter(|p| *p > 100) {
                return Err(FieldsError::InvalidProbability {
                    stage: stage.id.clone(),
                    probability,
                });
            }
        }
        Ok(())
    }

    fn duplicate(&self, name: &str) -> FieldsError {
        FieldsError::DuplicateFieldName {
            entity_type: self.name.clone(),
            name: name.to_string(),
        }
    }

    fn not_found(&self, name: &str) -> FieldsError {
        FieldsError::FieldNotFound {
            entity_type: self.name.clone(),
            name: name.to_string(),
        }
    }
}

fn check_field(field: &FieldDef) -> Result<()> {
    if !field.options.is_empty() && !field.field_type.has_options() {
        return Err(FieldsError::OptionsNotAllowed {
            field: field.name.clone(),
            field_type: field.field_type.to_string(),
        });
    }
    let mut values = HashSet::new();
    for option in &field.options {
        if !values.insert(option.value.as_str()) {
            return Err(FieldsError::DuplicateOption {
                field: field.name.clone(),
                value: option.value.clone(),
            });
        }
    }
    if field.formula.is_some() && field.field_type != FieldType::Formula {
        return Err(FieldsError::FormulaNotAllowed {
            field: field.name.clone(),
            field_type: field.field_type.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectOption;

    fn contact() -> EntityTypeDef {
        EntityTypeDef::new("contact", "Contact", "Contacts", "user")
            .field(FieldDef::new("name", "Name", FieldType::Text).required())
            .field(FieldDef::new("email", "Email", FieldType::Email))
            .field(FieldDef::new("phone", "Phone", FieldType::Phone))
            .searchable(&["name", "email"])
            .summary(&["name", "email", "phone"])
    }

    #[test]
    fn builder_assigns_order() {
        let et = contact();
        let orders: Vec<i32> = et.fields.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(et.check().is_ok());
    }

    #[test]
    fn ordered_fields_is_stable() {
        let mut et = contact();
        for f in &mut et.fields {
            f.order = 1;
        }
        et.fields[2].order = 0;
        let names: Vec<&str> = et.ordered_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["phone", "name", "email"]);
    }

    #[test]
    fn add_field_rejects_duplicates() {
        let mut et = contact();
        let err = et
            .add_field(FieldDef::new("email", "Other", FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldName { .. }));
        et.add_field(FieldDef::new("title", "Title", FieldType::Text))
            .unwrap();
        assert!(et.get_field("title").is_some());
    }

    #[test]
    fn added_fields_sort_after_builder_fields() {
        let mut et = contact();
        et.add_field(FieldDef::new("title", "Title", FieldType::Text))
            .unwrap();
        et.add_field(FieldDef::new("first", "First", FieldType::Text).order(-1))
            .unwrap();
        let names: Vec<&str> = et.ordered_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "name", "email", "phone", "title"]);
        assert_eq!(et.get_field("title").unwrap().order, 4);
    }

    #[test]
    fn remove_field_prunes_lists() {
        let mut et = contact();
        let removed = et.remove_field("email").unwrap();
        assert_eq!(removed.name, "email");
        assert_eq!(et.searchable_fields, vec!["name"]);
        assert_eq!(et.summary_fields, vec!["name", "phone"]);
        assert!(et.check().is_ok());
        assert!(matches!(
            et.remove_field("email"),
            Err(FieldsError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn update_field_renames_references() {
        let mut et = contact();
        let renamed = FieldDef::new("work_email", "Work Email", FieldType::Email);
        et.update_field("email", renamed).unwrap();
        assert!(et.get_field("email").is_none());
        assert_eq!(et.searchable_fields, vec!["name", "work_email"]);
        assert_eq!(et.summary_fields[1], "work_email");
        assert!(et.check().is_ok());
    }

    #[test]
    fn update_field_rejects_collision() {
        let mut et = contact();
        let err = et
            .update_field("email", FieldDef::new("name", "Name", FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldName { .. }));
        assert!(et.get_field("email").is_some());
    }

    #[test]
    fn check_catches_unknown_references() {
        let et = contact().searchable(&["nickname"]);
        assert_eq!(
            et.check().unwrap_err(),
            FieldsError::UnknownFieldReference {
                entity_type: "contact".into(),
                list: "searchableFields",
                name: "nickname".into(),
            }
        );
    }

    #[test]
    fn check_catches_duplicate_options() {
        let et = EntityTypeDef::new("lead", "Lead", "Leads", "target").field(
            FieldDef::new("source", "Source", FieldType::Select).options([
                SelectOption::new("web", "Web"),
                SelectOption::new("web", "Website"),
            ]),
        );
        assert!(matches!(
            et.check(),
            Err(FieldsError::DuplicateOption { .. })
        ));
    }

    #[test]
    fn check_catches_misplaced_options_and_formula() {
        let with_options = EntityTypeDef::new("a", "A", "As", "x").field(
            FieldDef::new("n", "N", FieldType::Number).options([SelectOption::new("1", "One")]),
        );
        assert!(matches!(
            with_options.check(),
            Err(FieldsError::OptionsNotAllowed { .. })
        ));

        let with_formula = EntityTypeDef::new("a", "A", "As", "x")
            .field(FieldDef::new("n", "N", FieldType::Number).formula("1 + 1"));
        assert!(matches!(
            with_formula.check(),
            Err(FieldsError::FormulaNotAllowed { .. })
        ));
    }

    #[test]
    fn check_pipeline_rules() {
        let mut et = contact();
        et.enable_pipeline = true;
        assert!(matches!(et.check(), Err(FieldsError::EmptyPipeline { .. })));

        let et = contact().pipeline([
            PipelineStage::new("new", "New", "#ccc", 1).probability(10),
            PipelineStage::new("new", "Again", "#ccc", 2),
        ]);
        assert!(matches!(et.check(), Err(FieldsError::DuplicateStage { .. })));

        let et = contact().pipeline([PipelineStage::new("won", "Won", "#0f0", 1).probability(150)]);
        assert!(matches!(
            et.check(),
            Err(FieldsError::InvalidProbability { probability: 150, .. })
        ));
    }

    #[test]
    fn entity_type_json_shape() {
        let et = contact()
            .view(DefaultView::Kanban)
            .pipeline([PipelineStage::new("open", "Open", "#00f", 1).probability(0)]);
        let json = serde_json::to_value(&et).unwrap();
        assert_eq!(json["pluralLabel"], "Contacts");
        assert_eq!(json["defaultView"], "kanban");
        assert_eq!(json["enablePipeline"], true);
        assert_eq!(json["pipelineStages"][0]["probability"], 0);
        let back: EntityTypeDef = serde_json::from_value(json).unwrap();
        assert_eq!(back, et);
    }

    #[test]
    fn entity_type_from_yaml_with_defaults() {
        let yaml = r#"
id: vendor
name: vendor
label: Vendor
pluralLabel: Vendors
icon: truck
fields:
  - id: vendor-name
    name: name
    label: Name
    type: text
    required: true
searchableFields: [name]
"#;
        let et: EntityTypeDef = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(et.default_view, DefaultView::Table);
        assert!(!et.enable_pipeline);
        assert!(et.summary_fields.is_empty());
        assert!(et.check().is_ok());
    }
}
