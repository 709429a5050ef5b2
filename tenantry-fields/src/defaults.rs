//! Default-value application.

use crate::entity::EntityTypeDef;
use crate::Record;

/// Return a copy of `data` with each field's `defaultValue` filled in where
/// the key is absent.
///
/// Keys that are present, even with a null value, are left alone, so
/// applying defaults twice gives the same record as applying them once.
pub fn apply_defaults(entity_type: &EntityTypeDef, data: &Record) -> Record {
    let mut out = data.clone();
    for field in &entity_type.fields {
        if let Some(default) = &field.default_value {
            if !out.contains_key(&field.name) {
                out.insert(field.name.clone(), default.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, FieldType};
    use tenantry_expr::Value;

    fn lead() -> EntityTypeDef {
        EntityTypeDef::new("lead", "Lead", "Leads", "target")
            .field(FieldDef::new("name", "Name", FieldType::Text))
            .field(FieldDef::new("status", "Status", FieldType::Select).default_value("new"))
            .field(FieldDef::new("score", "Score", FieldType::Number).default_value(0))
    }

    #[test]
    fn fills_absent_keys_only() {
        let mut data = Record::new();
        data.insert("status".into(), "qualified".into());
        let out = apply_defaults(&lead(), &data);
        assert_eq!(out["status"], Value::from("qualified"));
        assert_eq!(out["score"], Value::from(0));
        assert!(!out.contains_key("name"));
    }

    #[test]
    fn does_not_mutate_input() {
        let data = Record::new();
        let out = apply_defaults(&lead(), &data);
        assert!(data.is_empty());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn explicit_null_is_kept() {
        let mut data = Record::new();
        data.insert("score".into(), Value::Null);
        let out = apply_defaults(&lead(), &data);
        assert_eq!(out["score"], Value::Null);
    }

    #[test]
    fn idempotent() {
        let once = apply_defaults(&lead(), &Record::new());
        let twice = apply_defaults(&lead(), &once);
        assert_eq!(once, twice);
    }
}
