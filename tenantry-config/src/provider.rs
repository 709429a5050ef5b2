//! Settings provider using Figment

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tenantry_common::Pretty;
use tracing::{debug, trace};

use crate::discovery::{ConfigFormat, FileDiscovery};
use crate::error::ConfigError;
use crate::settings::EngineSettings;
use crate::ConfigResult;

/// Environment variable prefix. `__` separates nested keys, so
/// `TENANTRY_FORMULA__MAX_DEPTH` sets `formula.max_depth`.
pub const ENV_PREFIX: &str = "TENANTRY_";

/// Loads [`EngineSettings`] from layered sources.
///
/// Later sources override earlier ones:
/// 1. Built-in defaults
/// 2. Discovered files (`~/.tenantry/`, then `./.tenantry/`)
/// 3. An explicit file, if given
/// 4. `TENANTRY_` environment variables
///
/// Nothing is cached; every [`SettingsProvider::load`] reads fresh.
#[derive(Debug, Clone, Default)]
pub struct SettingsProvider {
    discovery: FileDiscovery,
    explicit_file: Option<PathBuf>,
}

impl SettingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discovery(mut self, discovery: FileDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Layer one more file above the discovered ones.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Load, extract and validate settings.
    pub fn load(&self) -> ConfigResult<EngineSettings> {
        let settings: EngineSettings = self.build_figment()?.extract()?;
        settings.validate()?;
        debug!("Loaded engine settings: {}", Pretty(&settings));
        Ok(settings)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(EngineSettings::default()));

        for file in self.discovery.discover_all() {
            trace!("Merging config file: {}", file.path.display());
            figment = figment.merge(file_provider(&file.path, file.format));
        }

        if let Some(path) = &self.explicit_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            let format =
                ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or_default()
                        .to_string(),
                })?;
            trace!("Merging explicit config file: {}", path.display());
            figment = figment.merge(file_provider(path, format));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

fn file_provider(path: &Path, format: ConfigFormat) -> Figment {
    match format {
        ConfigFormat::Toml => Figment::from(Toml::file(path)),
        ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
        ConfigFormat::Json => Figment::from(Json::file(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn isolated(dir: &TempDir) -> SettingsProvider {
        let project = dir.path().join("project");
        let global = dir.path().join("global");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&global).unwrap();
        SettingsProvider::new().with_discovery(FileDiscovery::with_directories(
            Some(project),
            Some(global),
        ))
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        let temp = TempDir::new().unwrap();
        let settings = isolated(&temp).load().unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    #[serial]
    fn test_project_overrides_global() {
        let temp = TempDir::new().unwrap();
        let provider = isolated(&temp);
        fs::write(
            temp.path().join("global/tenantry.toml"),
            "[formula]\nmax_depth = 8\nmax_input_bytes = 512\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("project/tenantry.yaml"),
            "formula:\n  max_depth: 12\n",
        )
        .unwrap();

        let settings = provider.load().unwrap();
        assert_eq!(settings.formula.max_depth, 12);
        assert_eq!(settings.formula.max_input_bytes, 512);
    }

    #[test]
    #[serial]
    fn test_explicit_file_overrides_discovered() {
        let temp = TempDir::new().unwrap();
        let provider = isolated(&temp);
        fs::write(
            temp.path().join("project/tenantry.json"),
            r#"{"templates": {"directory": "/srv/templates"}, "formula": {"max_depth": 9}}"#,
        )
        .unwrap();
        let explicit = temp.path().join("override.yaml");
        fs::write(&explicit, "templates:\n  directory: /opt/templates\n").unwrap();

        let settings = provider.with_file(&explicit).load().unwrap();
        assert_eq!(
            settings.templates.directory,
            Some(PathBuf::from("/opt/templates"))
        );
        assert_eq!(settings.formula.max_depth, 9);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = isolated(&temp)
            .with_file(temp.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_unsupported_explicit_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ini");
        fs::write(&path, "").unwrap();
        let err = isolated(&temp).with_file(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let provider = isolated(&temp);
        fs::write(
            temp.path().join("project/tenantry.toml"),
            "[formula]\nmax_depth = \"deep\"\n",
        )
        .unwrap();
        let err = provider.load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
