//! Record operations on tenant-defined entity types.

use std::sync::Arc;

use chrono::Utc;
use tenantry_common::Pretty;
use tenantry_expr::Value;
use tenantry_expr::Limits;
use tenantry_fields::{apply_defaults, EntityTypeDef, FormulaEngine, Record, Validator};
use tracing::debug;

use crate::error::{Result, WorkspaceError};
use crate::store::EntityStore;
use crate::types::DynamicEntity;

/// Runs records through their entity type and hands them to an
/// [`EntityStore`].
#[derive(Clone)]
pub struct EntityTypeService {
    store: Arc<dyn EntityStore>,
    validator: Validator,
    formulas: FormulaEngine,
}

impl std::fmt::Debug for EntityTypeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTypeService")
            .field("validator", &self.validator)
            .field("formulas", &self.formulas)
            .finish_non_exhaustive()
    }
}

impl EntityTypeService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            validator: Validator::default(),
            formulas: FormulaEngine::default(),
        }
    }

    /// Compile custom validators and formulas under `limits`.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.validator = Validator::new(limits);
        self.formulas = FormulaEngine::new(limits);
        self
    }

    /// Use `validator` for record validation.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Use `engine` for formula recomputation.
    pub fn with_formula_engine(mut self, engine: FormulaEngine) -> Self {
        self.formulas = engine;
        self
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Move an entity to `new_stage` of its entity type's pipeline.
    ///
    /// Returns the patch sent to the store: `stage`, `stageChangedAt` and,
    /// when the stage defines one, `probability`.
    pub async fn move_entity_to_stage(
        &self,
        workspace_id: &str,
        entity_id: &str,
        entity_type: &EntityTypeDef,
        new_stage: &str,
        user_id: Option<&str>,
    ) -> Result<Record> {
        if !entity_type.enable_pipeline {
            return Err(WorkspaceError::PipelineNotSupported {
                entity_type: entity_type.name.clone(),
            });
        }
        let stage = entity_type
            .stage(new_stage)
            .ok_or_else(|| WorkspaceError::InvalidStage {
                entity_type: entity_type.name.clone(),
                stage: new_stage.to_string(),
            })?;

        let mut patch = Record::new();
        patch.insert("stage".into(), Value::from(stage.id.as_str()));
        patch.insert("stageChangedAt".into(), Value::Date(Utc::now()));
        if let Some(probability) = stage.probability {
            patch.insert("probability".into(), Value::from(f64::from(probability)));
        }

        debug!(
            workspace_id,
            entity_id,
            entity_type = %entity_type.name,
            stage = %stage.id,
            "moving entity to stage"
        );
        self.store
            .update_entity(workspace_id, entity_id, &patch, user_id)
            .await?;
        Ok(patch)
    }

    pub async fn get_entity_count(
        &self,
        workspace_id: &str,
        entity_type_name: &str,
        user_id: Option<&str>,
    ) -> Result<usize> {
        self.store
            .count_entities(workspace_id, entity_type_name, user_id)
            .await
    }

    /// Validate, apply defaults and recompute formulas.
    pub async fn prepare_record(&self, entity_type: &EntityTypeDef, data: &Record) -> Result<Record> {
        let result = self.validator.validate_entity(entity_type, data);
        if !result.valid {
            debug!(entity_type = %entity_type.name, errors = %Pretty(&result.errors), "record rejected");
            return Err(WorkspaceError::Validation {
                errors: result.errors,
            });
        }
        let defaulted = apply_defaults(entity_type, data);
        Ok(self.formulas.calculate(entity_type, &defaulted).await)
    }

    pub async fn create_entity(
        &self,
        workspace_id: &str,
        entity_type: &EntityTypeDef,
        data: &Record,
        user_id: Option<&str>,
    ) -> Result<DynamicEntity> {
        let prepared = self.prepare_record(entity_type, data).await?;
        let entity = DynamicEntity::new(&entity_type.name, workspace_id, user_id, prepared);
        debug!(workspace_id, entity_id = %entity.id, entity_type = %entity_type.name, "creating entity");
        self.store.create_entity(entity).await
    }

    /// Merge `patch` over the stored data, prepare the result and save it.
    pub async fn update_entity(
        &self,
        workspace_id: &str,
        entity_id: &str,
        entity_type: &EntityTypeDef,
        patch: &Record,
        user_id: Option<&str>,
    ) -> Result<DynamicEntity> {
        let current = self.store.get_entity(workspace_id, entity_id).await?;
        let mut merged = current.data;
        for (name, value) in patch {
            merged.insert(name.clone(), value.clone());
        }
        let prepared = self.prepare_record(entity_type, &merged).await?;
        debug!(workspace_id, entity_id, entity_type = %entity_type.name, "updating entity");
        self.store
            .update_entity(workspace_id, entity_id, &prepared, user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{company, contact, deal};
    use crate::store::MemoryEntityStore;

    fn service() -> EntityTypeService {
        EntityTypeService::new(Arc::new(MemoryEntityStore::new()))
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_pipeline_guard_precedes_stage_lookup() {
        let service = service();
        let err = service
            .move_entity_to_stage("ws", "e1", &company(), "prospecting", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::PipelineNotSupported { .. }));
    }

    #[tokio::test]
    async fn test_unknown_stage() {
        let err = service()
            .move_entity_to_stage("ws", "e1", &deal(), "won", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidStage { ref stage, .. } if stage == "won"));
    }

    #[tokio::test]
    async fn test_closed_lost_keeps_zero_probability() {
        let service = service();
        let created = service
            .create_entity("ws", &deal(), &record(&[("name", "Lost".into())]), None)
            .await
            .unwrap();
        let patch = service
            .move_entity_to_stage("ws", &created.id, &deal(), "closed-lost", None)
            .await
            .unwrap();
        assert_eq!(patch["probability"], Value::from(0));
    }

    #[tokio::test]
    async fn test_prepare_rejects_invalid_record() {
        let err = service()
            .prepare_record(&contact(), &record(&[("first_name", "Ada".into())]))
            .await
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["last_name", "email"]);
    }

    #[tokio::test]
    async fn test_limits_reach_custom_validators() {
        let mut contact = contact();
        for field in &mut contact.fields {
            if field.name == "first_name" {
                field.validation = Some(tenantry_fields::ValidationRules {
                    custom_validator: Some("value.length >= 2".into()),
                    ..Default::default()
                });
            }
        }
        let data = record(&[
            ("first_name", "Ada".into()),
            ("last_name", "Lovelace".into()),
            ("email", "ada@example.com".into()),
        ]);
        assert!(service().prepare_record(&contact, &data).await.is_ok());

        let tight = service().with_limits(Limits {
            max_input_bytes: 8,
            max_depth: 32,
        });
        let err = tight.prepare_record(&contact, &data).await.unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors[0].field, "first_name");
        assert_eq!(errors[0].message, "First Name has an invalid validator");
    }

    #[tokio::test]
    async fn test_prepare_computes_formulas() {
        let prepared = service()
            .prepare_record(
                &contact(),
                &record(&[
                    ("first_name", "Ada".into()),
                    ("last_name", "Lovelace".into()),
                    ("email", "ada@example.com".into()),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(prepared["full_name"], Value::from("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_update_merges_before_validation() {
        let service = service();
        let created = service
            .create_entity(
                "ws",
                &deal(),
                &record(&[
                    ("name", "Renewal".into()),
                    ("amount", 1000.into()),
                    ("probability", 10.into()),
                ]),
                Some("alice"),
            )
            .await
            .unwrap();
        assert_eq!(created.data["weighted_amount"], Value::from(100));

        let updated = service
            .update_entity("ws", &created.id, &deal(), &record(&[("probability", 50.into())]), None)
            .await
            .unwrap();
        assert_eq!(updated.data["name"], Value::from("Renewal"));
        assert_eq!(updated.data["weighted_amount"], Value::from(500));

        let err = service
            .update_entity("ws", &created.id, &deal(), &record(&[("name", Value::Null)]), None)
            .await
            .unwrap_err();
        assert!(err.validation_errors().is_some());
    }

    #[tokio::test]
    async fn test_entity_count() {
        let service = service();
        let data = record(&[("name", "Acme".into())]);
        for user in ["alice", "alice", "bob"] {
            service
                .create_entity("ws", &company(), &data, Some(user))
                .await
                .unwrap();
        }
        assert_eq!(service.get_entity_count("ws", "company", None).await.unwrap(), 3);
        assert_eq!(
            service
                .get_entity_count("ws", "company", Some("alice"))
                .await
                .unwrap(),
            2
        );
    }
}
