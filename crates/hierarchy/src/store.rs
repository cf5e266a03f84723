use crate::error::ConfigError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use vocab_model::HierarchyConfiguration;

/// Persistence of hierarchy configurations, one per scope name
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored configuration, or the default one when nothing was saved
    async fn load_config(&self, scope: &str) -> Result<HierarchyConfiguration, ConfigError>;

    async fn save_config(
        &self,
        scope: &str,
        config: &HierarchyConfiguration,
    ) -> Result<(), ConfigError>;
}

fn validate_scope(scope: &str) -> Result<(), ConfigError> {
    let valid = !scope.is_empty()
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !scope.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidScope(scope.to_string()))
    }
}

/// One `<scope>.toml` file per scope under a directory
#[derive(Debug, Clone)]
pub struct TomlConfigStore {
    dir: PathBuf,
}

impl TomlConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, scope: &str) -> Result<PathBuf, ConfigError> {
        validate_scope(scope)?;
        Ok(self.dir.join(format!("{scope}.toml")))
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn load_config(&self, scope: &str) -> Result<HierarchyConfiguration, ConfigError> {
        let path = self.path_for(scope)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no stored configuration for {scope}, using default");
                return Ok(HierarchyConfiguration::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(toml::from_str(&raw)?)
    }

    async fn save_config(
        &self,
        scope: &str,
        config: &HierarchyConfiguration,
    ) -> Result<(), ConfigError> {
        let path = self.path_for(scope)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let encoded = toml::to_string_pretty(config)?;
        let tmp = path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, encoded).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("saved configuration {}", path.display());
        Ok(())
    }
}

/// Map-backed store
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    configs: Mutex<HashMap<String, HierarchyConfiguration>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load_config(&self, scope: &str) -> Result<HierarchyConfiguration, ConfigError> {
        validate_scope(scope)?;
        Ok(self
            .configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scope)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_config(
        &self,
        scope: &str,
        config: &HierarchyConfiguration,
    ) -> Result<(), ConfigError> {
        validate_scope(scope)?;
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope.to_string(), config.clone());
        Ok(())
    }
}
