//! Template catalog: built-in templates plus any loaded from disk.

use std::path::Path;

use indexmap::IndexMap;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Result, WorkspaceError};
use crate::templates::built_in_templates;
use crate::types::WorkspaceTemplate;

const TEMPLATE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Templates keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: IndexMap<String, WorkspaceTemplate>,
}

impl TemplateCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in industry templates.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for template in built_in_templates() {
            catalog.insert(template);
        }
        catalog
    }

    /// Add a template, replacing any existing one with the same id in place.
    pub fn insert(&mut self, template: WorkspaceTemplate) -> Option<WorkspaceTemplate> {
        self.templates.insert(template.id.clone(), template)
    }

    pub fn get(&self, id: &str) -> Option<&WorkspaceTemplate> {
        self.templates.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkspaceTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load every `*.yaml`, `*.yml` and `*.json` template in `dir`.
    ///
    /// Files that fail to parse or whose entity types fail their checks are
    /// skipped with a warning. Returns how many templates were loaded.
    pub async fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| WorkspaceError::io(dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::io(dir, e))?
        {
            let path = entry.path();
            if is_template_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match read_template(&path).await {
                Ok(template) => {
                    debug!(id = %template.id, path = %path.display(), "loaded template");
                    if self.insert(template).is_some() {
                        debug!(path = %path.display(), "template overrides an existing entry");
                    }
                    loaded += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping template file"),
            }
        }
        Ok(loaded)
    }
}

fn is_template_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

async fn read_template(path: &Path) -> Result<WorkspaceTemplate> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| WorkspaceError::io(path, e))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let template: WorkspaceTemplate = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml_ng::from_str(&content)?
    };
    template.check()?;
    Ok(template)
}
