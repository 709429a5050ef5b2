//! The boundary between entity services and persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{Result, WorkspaceError};
use crate::types::DynamicEntity;
use tenantry_fields::Record;

/// Persistence for dynamic entities. Implementations live with the host
/// application; [`MemoryEntityStore`] is provided for tests and demos.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Store a new entity and return it as stored.
    async fn create_entity(&self, entity: DynamicEntity) -> Result<DynamicEntity>;

    /// Fetch one entity.
    async fn get_entity(&self, workspace_id: &str, entity_id: &str) -> Result<DynamicEntity>;

    /// Merge `patch` into the entity's data and return the updated entity.
    async fn update_entity(
        &self,
        workspace_id: &str,
        entity_id: &str,
        patch: &Record,
        user_id: Option<&str>,
    ) -> Result<DynamicEntity>;

    /// Number of entities of `entity_type` in the workspace, optionally
    /// limited to those owned by `user_id`.
    async fn count_entities(
        &self,
        workspace_id: &str,
        entity_type: &str,
        user_id: Option<&str>,
    ) -> Result<usize>;
}

/// An [`EntityStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    entities: RwLock<HashMap<(String, String), DynamicEntity>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

fn key(workspace_id: &str, entity_id: &str) -> (String, String) {
    (workspace_id.to_string(), entity_id.to_string())
}

fn not_found(workspace_id: &str, entity_id: &str) -> WorkspaceError {
    WorkspaceError::store(format!(
        "entity {entity_id} not found in workspace {workspace_id}"
    ))
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn create_entity(&self, entity: DynamicEntity) -> Result<DynamicEntity> {
        let mut entities = self.entities.write().await;
        let key = key(&entity.workspace_id, &entity.id);
        if entities.contains_key(&key) {
            return Err(WorkspaceError::store(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn get_entity(&self, workspace_id: &str, entity_id: &str) -> Result<DynamicEntity> {
        self.entities
            .read()
            .await
            .get(&key(workspace_id, entity_id))
            .cloned()
            .ok_or_else(|| not_found(workspace_id, entity_id))
    }

    async fn update_entity(
        &self,
        workspace_id: &str,
        entity_id: &str,
        patch: &Record,
        _user_id: Option<&str>,
    ) -> Result<DynamicEntity> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(&key(workspace_id, entity_id))
            .ok_or_else(|| not_found(workspace_id, entity_id))?;
        for (name, value) in patch {
            entity.data.insert(name.clone(), value.clone());
        }
        entity.updated_at = Utc::now();
        Ok(entity.clone())
    }

    async fn count_entities(
        &self,
        workspace_id: &str,
        entity_type: &str,
        user_id: Option<&str>,
    ) -> Result<usize> {
        let entities = self.entities.read().await;
        Ok(entities
            .values()
            .filter(|e| e.workspace_id == workspace_id && e.entity_type == entity_type)
            .filter(|e| user_id.is_none() || e.user_id.as_deref() == user_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantry_expr::Value;

    fn entity(entity_type: &str, workspace: &str, user: Option<&str>) -> DynamicEntity {
        DynamicEntity::new(entity_type, workspace, user, Record::new())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryEntityStore::new();
        let created = store.create_entity(entity("deal", "ws", None)).await.unwrap();
        let fetched = store.get_entity("ws", &created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert!(store.get_entity("other", &created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let store = MemoryEntityStore::new();
        let created = store.create_entity(entity("deal", "ws", None)).await.unwrap();
        assert!(store.create_entity(created).await.is_err());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryEntityStore::new();
        let mut seed = entity("deal", "ws", None);
        seed.data.insert("name".into(), "Big deal".into());
        let created = store.create_entity(seed).await.unwrap();

        let mut patch = Record::new();
        patch.insert("stage".into(), "proposal".into());
        let updated = store
            .update_entity("ws", &created.id, &patch, Some("u1"))
            .await
            .unwrap();
        assert_eq!(updated.data["name"], Value::from("Big deal"));
        assert_eq!(updated.data["stage"], Value::from("proposal"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_entity() {
        let store = MemoryEntityStore::new();
        let err = store
            .update_entity("ws", "missing", &Record::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::Store { .. }));
    }

    #[tokio::test]
    async fn test_count_filters_by_workspace_type_and_user() {
        let store = MemoryEntityStore::new();
        for e in [
            entity("deal", "ws", Some("alice")),
            entity("deal", "ws", Some("bob")),
            entity("contact", "ws", Some("alice")),
            entity("deal", "other", Some("alice")),
        ] {
            store.create_entity(e).await.unwrap();
        }
        assert_eq!(store.count_entities("ws", "deal", None).await.unwrap(), 2);
        assert_eq!(
            store.count_entities("ws", "deal", Some("alice")).await.unwrap(),
            1
        );
        assert_eq!(store.count_entities("ws", "company", None).await.unwrap(), 0);
    }
}
