use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "CONTRACT_CHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Backend root: command line flag, then environment, then config file
    pub fn resolve_api_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        flag.or(env)
            .or(self.api_base_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Unset or zero means requests never time out
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("contract-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_base_url: Some("http://agent.internal:9000".to_string()),
            request_timeout_secs: Some(30),
            log_level: None,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"log_level":"debug"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_base_url: Some("http://from-file:8000/".to_string()),
            ..Config::new()
        };

        assert_eq!(
            config.resolve_api_url(Some("http://flag:1"), Some("http://env:2")),
            "http://flag:1"
        );
        assert_eq!(config.resolve_api_url(None, Some("http://env:2")), "http://env:2");
        assert_eq!(config.resolve_api_url(None, None), "http://from-file:8000");
        assert_eq!(Config::new().resolve_api_url(None, None), DEFAULT_API_URL);
        assert_eq!(Config::new().resolve_api_url(Some("  "), None), DEFAULT_API_URL);
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let mut config = Config::new();
        assert!(config.request_timeout().is_none());
        config.request_timeout_secs = Some(0);
        assert!(config.request_timeout().is_none());
        config.request_timeout_secs = Some(45);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(45)));
    }
}
