//! CLI configuration and persisted client state

use crate::error::{DashboardError, Result};
use crate::observable::Observable;
use lensadm_common::forms::ValidationMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "LENSADM_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_server: String,
    pub default_output: String,
    pub token: Option<String>,
    pub username: Option<String>,
    /// Last section shown by `dashboard`/`menu`
    pub active_menu: Option<String>,
    pub validation: ValidationMode,
    pub reload_namespaces_on_login: bool,
    pub remember_menu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: "http://localhost:8080".to_string(),
            default_output: "table".to_string(),
            token: None,
            username: None,
            active_menu: None,
            validation: ValidationMode::Strict,
            reload_namespaces_on_login: true,
            remember_menu: true,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var("HOME")
            .map_err(|_| DashboardError::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home).join(".config/lensadm/cli.toml"))
    }
}

/// Configuration file kept in memory and written back on every change
#[derive(Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Observable<Config>,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(Self {
            path,
            config: Observable::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Config {
        self.config.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
        self.config.with(f)
    }

    /// Apply `f` and persist the result
    pub fn update(&self, f: impl FnOnce(&mut Config)) -> Result<()> {
        self.config.update(f);
        self.config.with(|config| config.save_to(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "validation = \"lenient\"\nusername = \"admin\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.validation, ValidationMode::Lenient);
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert!(config.remember_menu);
    }

    #[test]
    fn test_store_persists_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cli.toml");
        let store = ConfigStore::open(&path).unwrap();

        store
            .update(|c| {
                c.token = Some("tok".to_string());
                c.active_menu = Some("roles".to_string());
            })
            .unwrap();

        let reloaded = ConfigStore::open(&path).unwrap();
        assert_eq!(reloaded.get().token.as_deref(), Some("tok"));
        assert_eq!(reloaded.get().active_menu.as_deref(), Some("roles"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "remember_menu = \"maybe\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(DashboardError::Config(_))
        ));
    }
}
