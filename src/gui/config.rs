use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub last_uri: Option<String>,
    pub animate: bool,
    pub can_load: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            last_uri: None,
            animate: true,
            can_load: true,
        }
    }
}

impl ViewerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                anyhow::anyhow!("Failed to read config file at {}: {}", config_path.display(), e)
            })?;

            // If the file is unreadable as config, fall back to defaults
            match serde_json::from_str::<Self>(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("Config file has issues ({}), using defaults", e);
                    Ok(Self::default())
                }
            }
        } else {
            log::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gif-view")
            .join("config.json")
    }
}
