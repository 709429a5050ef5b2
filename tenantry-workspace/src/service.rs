//! Workspace configuration lifecycle: defaults, templates, incremental edits
//! and export/import.
//!
//! Every successful mutation bumps `version` and refreshes `updatedAt`. A
//! failed mutation leaves the configuration untouched.

use tenantry_common::Pretty;
use tenantry_fields::EntityTypeDef;
use tracing::{debug, info};

use crate::catalog::TemplateCatalog;
use crate::defaults::default_configuration;
use crate::error::{Result, WorkspaceError};
use crate::templates::built_in_templates;
use crate::types::{NavigationItem, ViewConfiguration, WorkspaceConfiguration, WorkspaceTemplate};

/// Creates and edits [`WorkspaceConfiguration`]s.
#[derive(Debug, Clone)]
pub struct WorkspaceConfigService {
    catalog: TemplateCatalog,
}

impl Default for WorkspaceConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceConfigService {
    /// A service over the built-in templates.
    pub fn new() -> Self {
        Self::with_catalog(TemplateCatalog::builtin())
    }

    pub fn with_catalog(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn default_configuration(&self, workspace_id: &str) -> WorkspaceConfiguration {
        debug!(workspace_id, "creating default configuration");
        default_configuration(workspace_id)
    }

    /// The built-in templates, regardless of what the catalog holds.
    pub fn built_in_templates(&self) -> Vec<WorkspaceTemplate> {
        built_in_templates()
    }

    /// Look up a template in the catalog.
    pub fn template(&self, id: &str) -> Option<&WorkspaceTemplate> {
        self.catalog.get(id)
    }

    /// Replace navigation and entity types with the template's. Views bound to
    /// entity types the template does not define are dropped.
    pub fn apply_template(&self, config: &mut WorkspaceConfiguration, template_id: &str) -> Result<()> {
        let template = self
            .template(template_id)
            .ok_or_else(|| WorkspaceError::TemplateNotFound {
                id: template_id.to_string(),
            })?;

        config.touch()?;
        config.navigation = template.navigation.clone();
        config.entity_types = template.entity_types.clone();
        let entity_types = &config.entity_types;
        config
            .views
            .retain(|v| entity_types.iter().any(|et| et.name == v.entity_type));

        info!(
            workspace_id = %config.workspace_id,
            template = template_id,
            version = config.version,
            "applied template"
        );
        debug!("navigation after template: {}", Pretty(&config.navigation));
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn add_navigation_item(
        &self,
        config: &mut WorkspaceConfiguration,
        item: NavigationItem,
    ) -> Result<()> {
        if config.navigation_item(&item.id).is_some() {
            return Err(WorkspaceError::DuplicateNavigationItem { id: item.id });
        }
        debug!(workspace_id = %config.workspace_id, id = %item.id, "adding navigation item");
        config.touch()?;
        config.navigation.push(item);
        Ok(())
    }

    /// Replace the navigation item with id `id`.
    pub fn update_navigation_item(
        &self,
        config: &mut WorkspaceConfiguration,
        id: &str,
        item: NavigationItem,
    ) -> Result<()> {
        let index = navigation_index(config, id)?;
        if item.id != id && config.navigation_item(&item.id).is_some() {
            return Err(WorkspaceError::DuplicateNavigationItem { id: item.id });
        }
        debug!(workspace_id = %config.workspace_id, id, "updating navigation item");
        config.touch()?;
        config.navigation[index] = item;
        Ok(())
    }

    pub fn remove_navigation_item(
        &self,
        config: &mut WorkspaceConfiguration,
        id: &str,
    ) -> Result<NavigationItem> {
        let index = navigation_index(config, id)?;
        debug!(workspace_id = %config.workspace_id, id, "removing navigation item");
        config.touch()?;
        let removed = config.navigation.remove(index);
        Ok(removed)
    }

    // =========================================================================
    // Entity types
    // =========================================================================

    /// Add a checked entity type and a custom navigation item listing it.
    pub fn add_entity_type(
        &self,
        config: &mut WorkspaceConfiguration,
        entity_type: EntityTypeDef,
    ) -> Result<()> {
        entity_type.check()?;
        if config.entity_type(&entity_type.name).is_some() {
            return Err(WorkspaceError::DuplicateEntityType {
                name: entity_type.name,
            });
        }
        let item = NavigationItem::for_custom_type(&entity_type, next_order(config)?);
        if config.navigation_item(&item.id).is_some() {
            return Err(WorkspaceError::DuplicateNavigationItem { id: item.id });
        }

        debug!(workspace_id = %config.workspace_id, entity_type = %entity_type.name, "adding entity type");
        config.touch()?;
        config.navigation.push(item);
        config.entity_types.push(entity_type);
        Ok(())
    }

    /// Replace the entity type called `name`. A rename rebinds navigation
    /// items and views to the new name.
    pub fn update_entity_type(
        &self,
        config: &mut WorkspaceConfiguration,
        name: &str,
        entity_type: EntityTypeDef,
    ) -> Result<()> {
        entity_type.check()?;
        let index = entity_type_index(config, name)?;
        let new_name = entity_type.name.clone();
        if new_name != name && config.entity_type(&new_name).is_some() {
            return Err(WorkspaceError::DuplicateEntityType { name: new_name });
        }

        debug!(workspace_id = %config.workspace_id, entity_type = name, "updating entity type");
        config.touch()?;
        if new_name != name {
            for item in &mut config.navigation {
                if item.entity_type.as_deref() == Some(name) {
                    item.entity_type = Some(new_name.clone());
                }
            }
            for view in &mut config.views {
                if view.entity_type == name {
                    view.entity_type.clone_from(&new_name);
                }
            }
        }

        config.entity_types[index] = entity_type;
        Ok(())
    }

    /// Remove an entity type with the navigation items and views bound to it.
    pub fn remove_entity_type(
        &self,
        config: &mut WorkspaceConfiguration,
        name: &str,
    ) -> Result<EntityTypeDef> {
        let index = entity_type_index(config, name)?;
        debug!(workspace_id = %config.workspace_id, entity_type = name, "removing entity type");
        config.touch()?;
        let removed = config.entity_types.remove(index);
        config
            .navigation
            .retain(|item| item.entity_type.as_deref() != Some(name));
        config.views.retain(|view| view.entity_type != name);
        Ok(removed)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Add a view. A default view replaces any previous default for the same
    /// entity type.
    pub fn add_view(&self, config: &mut WorkspaceConfiguration, view: ViewConfiguration) -> Result<()> {
        if config.entity_type(&view.entity_type).is_none() {
            return Err(WorkspaceError::EntityTypeNotFound {
                name: view.entity_type,
            });
        }
        if config.views.iter().any(|v| v.id == view.id) {
            return Err(WorkspaceError::DuplicateView { id: view.id });
        }
        config.touch()?;
        if view.is_default {
            for existing in &mut config.views {
                if existing.entity_type == view.entity_type {
                    existing.is_default = false;
                }
            }
        }
        debug!(workspace_id = %config.workspace_id, view = %view.id, "adding view");
        config.views.push(view);
        Ok(())
    }

    // =========================================================================
    // Export / import
    // =========================================================================

    pub fn export_configuration(&self, config: &WorkspaceConfiguration) -> Result<String> {
        Ok(serde_json::to_string_pretty(config)?)
    }

    /// Parse an exported configuration into `workspace_id`. Every entity type
    /// is checked; the version is bumped past the exported one.
    pub fn import_configuration(&self, json: &str, workspace_id: &str) -> Result<WorkspaceConfiguration> {
        let mut config: WorkspaceConfiguration = serde_json::from_str(json)?;
        let mut seen = std::collections::HashSet::new();
        for entity_type in &config.entity_types {
            entity_type.check()?;
            if !seen.insert(entity_type.name.as_str()) {
                return Err(WorkspaceError::DuplicateEntityType {
                    name: entity_type.name.clone(),
                });
            }
        }
        debug!(
            from = %config.workspace_id,
            to = workspace_id,
            "importing configuration"
        );
        config.workspace_id = workspace_id.to_string();
        config.touch()?;
        Ok(config)
    }
}

fn navigation_index(config: &WorkspaceConfiguration, id: &str) -> Result<usize> {
    config
        .navigation
        .iter()
        .position(|n| n.id == id)
        .ok_or_else(|| WorkspaceError::NavigationItemNotFound { id: id.to_string() })
}

fn entity_type_index(config: &WorkspaceConfiguration, name: &str) -> Result<usize> {
    config
        .entity_types
        .iter()
        .position(|et| et.name == name)
        .ok_or_else(|| WorkspaceError::EntityTypeNotFound {
            name: name.to_string(),
        })
}

fn next_order(config: &WorkspaceConfiguration) -> Result<i32> {
    let highest = config.navigation.iter().map(|n| n.order).max().unwrap_or(0);
    highest
        .checked_add(1)
        .ok_or(WorkspaceError::NavigationOrderExhausted { order: highest })
}
