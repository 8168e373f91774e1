//! Loading of `config.toml`.
//!
//! The file is optional. A missing file, an unreadable file, and a file that
//! fails to parse all fall back to the built-in defaults, so the chat always
//! starts.

use std::path::{Path, PathBuf};

use tomodachi_core::config::AppConfig;
use tomodachi_core::error::Result;

use crate::paths::{PathError, ServiceType, TomodachiPaths};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> std::result::Result<Self, PathError> {
        let path = TomodachiPaths::new(base_path).get_path(ServiceType::Config)?;
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the file, reporting every failure.
    pub fn try_load(&self) -> Result<Option<AppConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&content)?))
    }

    /// Loads the configuration, using defaults for anything that fails.
    pub fn load_or_default(&self) -> AppConfig {
        match self.try_load() {
            Ok(Some(mut config)) => {
                config.chat.ai_age = config.chat.ai_age.max(1);
                tracing::info!("Loaded configuration from {:?}", self.path);
                config
            }
            Ok(None) => {
                tracing::info!("No configuration at {:?}, using defaults", self.path);
                AppConfig::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load configuration from {:?}, using defaults: {}",
                    self.path,
                    e
                );
                AppConfig::default()
            }
        }
    }
}
