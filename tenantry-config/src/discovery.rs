//! Settings file discovery
//!
//! Looks for `tenantry.{toml,yaml,yml,json}` in the global directory
//! (`~/.tenantry/`) and the project directory (`./.tenantry/`). Project files
//! take precedence over global ones.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Directory name used for both the global and project settings locations.
pub const CONFIG_DIR_NAME: &str = ".tenantry";

const FILE_NAMES: [&str; 4] = [
    "tenantry.toml",
    "tenantry.yaml",
    "tenantry.yml",
    "tenantry.json",
];

/// A discovered settings file with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub scope: ConfigScope,
}

/// Settings file format detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Where a settings file was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    /// `~/.tenantry/`
    Global,
    /// `./.tenantry/`
    Project,
}

/// Finds settings files in the global and project directories.
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery rooted at the current directory and the home directory,
    /// resolved when [`FileDiscovery::discover_all`] runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery over explicit directories instead of the defaults.
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// All settings files, lowest precedence first.
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let project_dir = self.project_dir.clone().or_else(resolve_project_dir);
        let global_dir = self.global_dir.clone().or_else(resolve_global_dir);

        let mut files = Vec::new();
        if let Some(dir) = &global_dir {
            files.extend(search_directory(dir, ConfigScope::Global));
        }
        if let Some(dir) = &project_dir {
            files.extend(search_directory(dir, ConfigScope::Project));
        }
        files.sort_by_key(|f| f.scope);

        debug!("Discovered {} configuration files", files.len());
        files
    }
}

fn search_directory(dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
    if !dir.exists() {
        trace!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }
    if !dir.is_dir() {
        warn!("Path exists but is not a directory: {}", dir.display());
        return Vec::new();
    }

    FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let format = ConfigFormat::from_path(&path)?;
            trace!("Found config: {} ({:?})", path.display(), format);
            Some(ConfigFile {
                path,
                format,
                scope,
            })
        })
        .collect()
}

fn resolve_project_dir() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
    dir.is_dir().then_some(dir)
}

fn resolve_global_dir() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
    dir.is_dir().then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("Json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }

    #[test]
    fn test_discover_orders_global_before_project() {
        let global = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(global.path().join("tenantry.yaml"), "logging: {}\n").unwrap();
        fs::write(project.path().join("tenantry.toml"), "").unwrap();
        fs::write(project.path().join("other.toml"), "").unwrap();

        let discovery = FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(global.path().to_path_buf()),
        );
        let files = discovery.discover_all();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scope, ConfigScope::Global);
        assert_eq!(files[0].format, ConfigFormat::Yaml);
        assert_eq!(files[1].scope, ConfigScope::Project);
        assert_eq!(files[1].format, ConfigFormat::Toml);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(search_directory(&missing, ConfigScope::Project).is_empty());
    }
}
