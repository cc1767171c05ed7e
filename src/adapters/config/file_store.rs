use crate::config::models::AppConfig;
use crate::core::error::ConfigError;
use crate::ports::{ConfigurationStore, ViewStateStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub(crate) struct TomlFileConfigAdapter {
    config_path: PathBuf,
}

impl TomlFileConfigAdapter {
    pub(crate) fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub(crate) fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn read_toml_file<T: DeserializeOwned>(&self, file_path: &Path) -> Result<T, ConfigError> {
        debug!("Reading TOML file: {:?}", file_path);
        let content = fs::read_to_string(file_path).map_err(|e| ConfigError::ReadFile {
            path: file_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Deserialize {
            path: file_path.to_path_buf(),
            source: Box::new(e),
        })
    }

    fn write_toml_file<T: Serialize>(&self, data: &T, file_path: &Path) -> Result<(), ConfigError> {
        debug!("Writing TOML file: {:?}", file_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content =
            toml::to_string_pretty(data).map_err(|e| ConfigError::Serialize(Box::new(e)))?;
        fs::write(file_path, content).map_err(|e| ConfigError::WriteFile {
            path: file_path.to_path_buf(),
            source: e,
        })
    }
}

impl ConfigurationStore for TomlFileConfigAdapter {
    fn load_app_config_file(&self, path: &Path) -> Result<AppConfig, ConfigError> {
        if !path.exists() {
            info!(
                "App config file (TOML) not found at {:?}. Will use default.",
                path
            );
            return Ok(AppConfig::default());
        }
        self.read_toml_file(path)
    }

    fn save_app_config_file(&self, config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
        self.write_toml_file(config, path)
    }
}

impl ViewStateStore for TomlFileConfigAdapter {
    fn load_last_active_view(&self) -> Option<String> {
        match self.load_app_config_file(&self.config_path) {
            Ok(config) => config
                .ui
                .last_active_view
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty()),
            Err(e) => {
                warn!("Could not read last active view: {}", e);
                None
            }
        }
    }

    fn save_last_active_view(&self, name: &str) {
        let mut config = match self.load_app_config_file(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Not saving last active view, config unreadable: {}", e);
                return;
            }
        };
        if config.ui.last_active_view.as_deref() == Some(name) {
            return;
        }
        config.ui.last_active_view = Some(name.to_string());
        if let Err(e) = self.save_app_config_file(&config, &self.config_path) {
            warn!("Failed to save last active view '{}': {}", name, e);
        }
    }
}
