//! Configuration management for mark-assistant

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `service.base_url`
pub const SERVICE_URL_ENV: &str = "MARK_SERVICE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub suggestions: SuggestionsConfig,
    pub ui: UiConfig,
}

/// Answering service connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Request timeout in seconds. Unset means the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Quiet period after the last keystroke before autocomplete fires
    pub debounce_ms: u64,
    /// Minimum trimmed input length for autocomplete
    pub min_chars: usize,
    /// Submit an autocomplete suggestion on selection instead of filling the input
    pub auto_submit: bool,
    /// Fetch server suggestion categories at session start
    pub load_categories: bool,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_chars: 2,
            auto_submit: false,
            load_categories: true,
        }
    }
}

impl SuggestionsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub welcome_message: String,
    pub placeholder_interval_ms: u64,
    pub placeholders: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Welcome to MarkSolution Enterprise.\n\
                              I am ready to analyze your daily reports and financial data."
                .to_string(),
            placeholder_interval_ms: 3000,
            placeholders: vec![
                "Ask about financial reports...".to_string(),
                "Past 3 months sales".to_string(),
                "Sales of Branch 1 today".to_string(),
                "Which branch has highest sales this month?".to_string(),
                "save as <name> to keep the last query".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from default location or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            if !url.trim().is_empty() {
                config.service.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = project_dirs() {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "mark-assistant")
}

/// Directory holding durable local state (saved shortcuts)
pub fn data_dir() -> Result<PathBuf> {
    let dir = project_dirs()
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".mark-assistant"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Directory for the interactive session log
pub fn state_dir() -> Result<PathBuf> {
    let dir = project_dirs()
        .map(|p| {
            p.state_dir()
                .map(|d| d.to_path_buf())
                .unwrap_or_else(|| p.cache_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from(".mark-assistant"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.service.base_url, "http://127.0.0.1:8000");
        assert!(cfg.service.timeout().is_none());
        assert_eq!(cfg.suggestions.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.suggestions.min_chars, 2);
        assert!(!cfg.suggestions.auto_submit);
        assert!(cfg.ui.welcome_message.starts_with("Welcome to MarkSolution"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [service]
            base_url = "http://reports.local:9000"
            timeout_secs = 15

            [suggestions]
            auto_submit = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.service.base_url, "http://reports.local:9000");
        assert_eq!(cfg.service.timeout(), Some(Duration::from_secs(15)));
        assert!(cfg.suggestions.auto_submit);
        assert_eq!(cfg.suggestions.debounce_ms, 300);
        assert_eq!(cfg.ui, UiConfig::default());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
