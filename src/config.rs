use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

/// Fallback when neither DIKAI_BASE_URL nor the config file names a backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub base_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { base_url: None }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("dikai").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_none() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.base_url.is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            base_url: Some("https://dikai.example.edu".to_string()),
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://dikai.example.edu"));
    }
}
