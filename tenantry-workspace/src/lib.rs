//! # Tenantry Workspace
//!
//! Workspace configuration for multi-tenant business apps: the navigation,
//! entity types and saved views a tenant works with, the industry templates
//! they start from, and the services that move records through their schema.
//!
//! ## Modules
//!
//! - [`types`] - Serializable configuration and record types
//! - [`defaults`] - The CRM configuration every workspace starts with
//! - [`templates`] / [`catalog`] - Built-in industry templates, optionally extended from disk
//! - [`service`] - [`WorkspaceConfigService`]: template application, incremental edits, export/import
//! - [`entity`] - [`EntityTypeService`]: record preparation and pipeline stage moves
//! - [`store`] - The [`EntityStore`] persistence boundary
//!
//! ```ignore
//! use std::sync::Arc;
//! use tenantry_workspace::{EntityTypeService, MemoryEntityStore, WorkspaceConfigService};
//!
//! let workspaces = WorkspaceConfigService::new();
//! let mut config = workspaces.default_configuration("acme");
//! workspaces.apply_template(&mut config, "real-estate")?;
//!
//! let entities = EntityTypeService::new(Arc::new(MemoryEntityStore::new()));
//! let property = config.entity_type("property").unwrap();
//! let created = entities.create_entity("acme", property, &data, None).await?;
//! ```

pub mod catalog;
pub mod defaults;
pub mod entity;
pub mod error;
pub mod service;
pub mod store;
pub mod templates;
pub mod types;

pub use catalog::TemplateCatalog;
pub use defaults::default_configuration;
pub use entity::EntityTypeService;
pub use error::{Result, WorkspaceError};
pub use service::WorkspaceConfigService;
pub use store::{EntityStore, MemoryEntityStore};
pub use templates::built_in_templates;
pub use types::{
    DynamicEntity, NavigationItem, SortDirection, ViewConfiguration, ViewFilter, ViewSort,
    WorkspaceConfiguration, WorkspaceTemplate,
};
