use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// SQLite file name, relative to the app data directory.
    pub database_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            database_file: "threads.db".to_string(),
        }
    }
}

/// Default app data directory outside the desktop shell.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rizz-replier")
}

impl AppConfig {
    pub fn load(app_data: &Path) -> Self {
        let config_path = app_data.join("config.json");
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("Ignoring unreadable {}: {}", config_path.display(), e);
                    Self::default()
                }),
                Err(_) => Self::default(),
            }
        } else {
            let c = Self::default();
            if let Err(e) = c.save(app_data) {
                log::warn!("Could not write default config: {}", e);
            }
            c
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Environment credentials win over the stored key.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in ["GEMINI_API_KEY", "API_KEY"] {
            if let Some(key) = lookup(name).filter(|k| !k.is_empty()) {
                self.gemini_api_key = key;
                return;
            }
        }
    }

    pub fn save(&self, app_data: &Path) -> Result<()> {
        let config_path = app_data.join("config.json");
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        std::fs::write(config_path, content)
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        Ok(())
    }

    pub fn database_path(&self, app_data: &Path) -> PathBuf {
        app_data.join(&self.database_file)
    }

    pub fn require_api_key(&self) -> Result<()> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(AppError::ConfigurationMissing(
                "Missing API key. Set GEMINI_API_KEY or add it in Settings.".to_string(),
            ));
        }
        Ok(())
    }

    /// Standing notice shown while the configuration is incomplete.
    pub fn startup_notice(&self) -> Option<String> {
        self.require_api_key().err().map(|e| e.to_string())
    }
}
