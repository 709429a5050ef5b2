//! Workspace configuration and record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenantry_fields::{DefaultView, EntityTypeDef, Record};

use crate::error::{Result, WorkspaceError};

/// One entry in the workspace sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub id: String,
    pub label: String,
    pub icon: String,
    /// Entity type listed by this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub order: i32,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub is_custom: bool,
}

fn visible_by_default() -> bool {
    true
}

impl NavigationItem {
    /// A visible built-in item linking to a fixed path.
    pub fn page(id: &str, label: &str, icon: &str, path: &str, order: i32) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            entity_type: None,
            path: Some(path.to_string()),
            order,
            visible: true,
            is_custom: false,
        }
    }

    /// A visible built-in item listing an entity type.
    pub fn entity(id: &str, label: &str, icon: &str, entity_type: &str, order: i32) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
            path: Some(format!("/{entity_type}")),
            ..Self::page(id, label, icon, "", order)
        }
    }

    /// The item created when a tenant adds an entity type.
    pub fn for_custom_type(entity_type: &EntityTypeDef, order: i32) -> Self {
        Self {
            is_custom: true,
            ..Self::entity(
                &format!("nav-{}", entity_type.name),
                &entity_type.plural_label,
                &entity_type.icon,
                &entity_type.name,
                order,
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSort {
    pub field: String,
    pub direction: SortDirection,
}

/// A saved filter. Operators are carried as written and interpreted by the
/// client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: tenantry_expr::Value,
}

/// A saved view over one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfiguration {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub display_type: DefaultView,
    #[serde(default)]
    pub filters: Vec<ViewFilter>,
    #[serde(default)]
    pub sorts: Vec<ViewSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_fields: Option<Vec<String>>,
    #[serde(default)]
    pub is_default: bool,
}

impl ViewConfiguration {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
        display_type: DefaultView,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            display_type,
            filters: Vec::new(),
            sorts: Vec::new(),
            group_by: None,
            visible_fields: None,
            is_default: false,
        }
    }
}

/// Navigation, entity types and views for one tenant workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfiguration {
    pub workspace_id: String,
    pub navigation: Vec<NavigationItem>,
    pub entity_types: Vec<EntityTypeDef>,
    #[serde(default)]
    pub views: Vec<ViewConfiguration>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceConfiguration {
    pub fn entity_type(&self, name: &str) -> Option<&EntityTypeDef> {
        self.entity_types.iter().find(|et| et.name == name)
    }

    pub fn navigation_item(&self, id: &str) -> Option<&NavigationItem> {
        self.navigation.iter().find(|n| n.id == id)
    }

    /// Navigation items sorted by `order`.
    pub fn ordered_navigation(&self) -> Vec<&NavigationItem> {
        let mut items: Vec<&NavigationItem> = self.navigation.iter().collect();
        items.sort_by_key(|n| n.order);
        items
    }

    pub fn views_for<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = &'a ViewConfiguration> + 'a {
        self.views.iter().filter(move |v| v.entity_type == entity_type)
    }

    /// Record a mutation: bump the version and refresh `updated_at`.
    ///
    /// Fails without changing anything once the version cannot grow, so
    /// callers touch before they mutate.
    pub(crate) fn touch(&mut self) -> Result<()> {
        self.version = self
            .version
            .checked_add(1)
            .ok_or_else(|| WorkspaceError::VersionExhausted {
                workspace_id: self.workspace_id.clone(),
            })?;
        self.updated_at = Utc::now().max(self.updated_at);
        Ok(())
    }
}

/// A pre-built configuration for one industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub icon: String,
    pub navigation: Vec<NavigationItem>,
    pub entity_types: Vec<EntityTypeDef>,
}

impl WorkspaceTemplate {
    /// Check every entity type in the template.
    pub fn check(&self) -> tenantry_fields::Result<()> {
        self.entity_types.iter().try_for_each(EntityTypeDef::check)
    }
}

/// One stored record of a tenant-defined entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub data: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Record>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DynamicEntity {
    /// A new entity with a fresh ULID id.
    pub fn new(
        entity_type: impl Into<String>,
        workspace_id: impl Into<String>,
        user_id: Option<&str>,
        data: Record,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ulid::Ulid::new().to_string(),
            entity_type: entity_type.into(),
            workspace_id: workspace_id.into(),
            user_id: user_id.map(str::to_string),
            data,
            relationships: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_item_json_shape() {
        let item = NavigationItem::entity("contacts", "Contacts", "users", "contact", 3);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["entityType"], "contact");
        assert_eq!(json["path"], "/contact");
        assert_eq!(json["isCustom"], false);
        assert_eq!(json["visible"], true);
    }

    #[test]
    fn test_navigation_item_visible_defaults_true() {
        let item: NavigationItem =
            serde_json::from_str(r#"{"id":"x","label":"X","icon":"i","order":1}"#).unwrap();
        assert!(item.visible);
        assert!(!item.is_custom);
    }

    #[test]
    fn test_dynamic_entity_round_trips_unknown_keys() {
        let mut data = Record::new();
        data.insert("name".into(), "Acme".into());
        data.insert("legacyId".into(), 42.into());
        let entity = DynamicEntity::new("company", "ws-1", Some("u-1"), data);
        assert_eq!(entity.id.len(), 26);

        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains("\"type\":\"company\""));
        let back: DynamicEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_view_configuration_json_shape() {
        let mut view = ViewConfiguration::new("v1", "Open deals", "deal", DefaultView::Kanban);
        view.group_by = Some("stage".into());
        view.sorts.push(ViewSort {
            field: "amount".into(),
            direction: SortDirection::Desc,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["displayType"], "kanban");
        assert_eq!(json["groupBy"], "stage");
        assert_eq!(json["sorts"][0]["direction"], "desc");
    }
}
