//! Configuration management for LexiMind using the prefer crate.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::InputExclusivity;

/// File inside the data directory that backs the local store.
pub const LOCAL_STORAGE_FILENAME: &str = "local_storage.json";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Page the CLI loads when no URL is given.
    pub page_url: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Whether typing text also drops a selected file.
    pub input_exclusivity: InputExclusivity,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("leximind");

        Self {
            data_dir,
            page_url: "http://127.0.0.1:5000/".to_string(),
            user_agent: format!("LexiMind/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: 120,
            input_exclusivity: InputExclusivity::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Path of the JSON file standing in for browser local storage.
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_STORAGE_FILENAME)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target directory for data.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// `two-way` or `file-clears-text`.
    #[serde(default)]
    pub input_exclusivity: Option<InputExclusivity>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers leximind config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("leximind").await {
            Ok(pref_config) => {
                let target: Option<String> = pref_config.get("target").ok();
                let page_url: Option<String> = pref_config.get("page_url").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let input_exclusivity: Option<String> =
                    pref_config.get("input_exclusivity").ok();

                Config {
                    target,
                    page_url,
                    user_agent,
                    request_timeout,
                    input_exclusivity: input_exclusivity.and_then(|raw| raw.parse().ok()),
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref target) = self.target {
            let path = shellexpand::tilde(target);
            settings.data_dir = PathBuf::from(path.as_ref());
        }
        if let Some(ref page_url) = self.page_url {
            settings.page_url = page_url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(exclusivity) = self.input_exclusivity {
            settings.input_exclusivity = exclusivity;
        }
    }
}

/// Load settings from configuration.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let config = Config {
            target: Some("/tmp/leximind-test".to_string()),
            page_url: Some("http://localhost:8000/search".to_string()),
            request_timeout: Some(5),
            input_exclusivity: Some(InputExclusivity::FileClearsText),
            ..Config::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.data_dir, PathBuf::from("/tmp/leximind-test"));
        assert_eq!(
            settings.local_storage_path(),
            PathBuf::from("/tmp/leximind-test/local_storage.json")
        );
        assert_eq!(settings.page_url, "http://localhost:8000/search");
        assert_eq!(settings.request_timeout, 5);
        assert_eq!(settings.input_exclusivity, InputExclusivity::FileClearsText);
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let mut settings = Settings::default();
        Config::default().apply_to_settings(&mut settings);
        assert_eq!(settings.input_exclusivity, InputExclusivity::TwoWay);
        assert!(settings.user_agent.starts_with("LexiMind/"));
    }

    #[test]
    fn test_config_deserializes_kebab_exclusivity() {
        let config: Config =
            serde_json::from_str(r#"{"input_exclusivity": "file-clears-text"}"#).unwrap();
        assert_eq!(
            config.input_exclusivity,
            Some(InputExclusivity::FileClearsText)
        );
    }
}
