//! Secret service implementation.
//!
//! Reads API keys from `secret.json` and caches them after the first load.
//! `GEMINI_API_KEY` in the environment takes precedence over the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tomodachi_core::config::{GeminiConfig, SecretConfig};
use tomodachi_core::secret::SecretService;

use crate::paths::{ServiceType, TomodachiPaths};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Service for managing secret configuration.
///
/// # Example
///
/// ```ignore
/// use tomodachi_infrastructure::SecretServiceImpl;
/// use tomodachi_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(None)?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    /// Cached secret config loaded from disk.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    env_override: Option<String>,
}

impl SecretServiceImpl {
    /// Creates a service reading `secret.json` from the config directory.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = TomodachiPaths::new(base_path)
            .get_path(ServiceType::Secret)
            .map_err(|e| anyhow::anyhow!("Failed to get secret path: {}", e))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            secrets: Arc::new(RwLock::new(None)),
            env_override: std::env::var(GEMINI_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    /// Replaces the environment-provided Gemini key.
    pub fn with_env_override(mut self, api_key: Option<String>) -> Self {
        self.env_override = api_key;
        self
    }

    async fn read_file(&self) -> Result<SecretConfig, String> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No secret file at {:?}", self.path);
                return Ok(SecretConfig::default());
            }
            Err(e) => {
                return Err(format!(
                    "Failed to read secret file at {}: {}",
                    self.path.display(),
                    e.kind()
                ));
            }
        };

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        // The serde message may quote file contents, so only the location is reported.
        serde_json::from_str(&content).map_err(|e| {
            format!(
                "Failed to parse secret file at {} (line {}, column {})",
                self.path.display(),
                e.line(),
                e.column()
            )
        })
    }

    fn apply_env_override(&self, mut config: SecretConfig) -> SecretConfig {
        if let Some(api_key) = &self.env_override {
            let model_name = config.gemini.as_ref().and_then(|g| g.model_name.clone());
            config.gemini = Some(GeminiConfig {
                api_key: api_key.clone(),
                model_name,
            });
        }
        config
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.apply_env_override(self.read_file().await?);
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
