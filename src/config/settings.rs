//! Application settings and configuration types.
//!
//! Settings are read from `settings.json` in the platform config directory
//! (or a path given on the command line). A missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::ai::OPENAI_BASE_URL;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid AI base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Record store location.
    pub database: DatabaseSettings,
    /// LLM provider configuration.
    pub ai: AiSettings,
    /// Inbox import and chat settings.
    pub inbox: InboxSettings,
}

impl Settings {
    /// Loads settings from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Settings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from the default location.
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(default_settings_path())
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), SettingsError> {
        url::Url::parse(&self.ai.base_url).map_err(|source| SettingsError::InvalidBaseUrl {
            url: self.ai.base_url.clone(),
            source,
        })?;

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(SettingsError::InvalidTemperature(self.ai.temperature));
        }

        Ok(())
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: data_dir().join("emails.db"),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Provider name, used as the keychain namespace for the API key.
    pub provider: String,
    /// OpenAI-compatible API endpoint.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in response.
    pub max_tokens: Option<usize>,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl AiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: None,
            timeout_seconds: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Inbox import and assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxSettings {
    /// JSON file used by the bulk import.
    pub mock_inbox_path: PathBuf,
    /// Number of emails listed in the inbox chat digest.
    pub chat_digest_limit: usize,
}

impl Default for InboxSettings {
    fn default() -> Self {
        Self {
            mock_inbox_path: data_dir().join("mock_inbox.json"),
            chat_digest_limit: 10,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "inbox-agent", "inbox-agent")
}

/// Platform data directory, falling back to `./data`.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Platform path of `settings.json`, falling back to the working directory.
pub fn default_settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.ai.model, "gpt-3.5-turbo");
        assert_eq!(settings.ai.temperature, 0.3);
        assert_eq!(settings.inbox.chat_digest_limit, 10);
        assert!(settings.database.path.ends_with("emails.db"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"ai": {"model": "gpt-4o-mini"}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert_eq!(settings.ai.base_url, OPENAI_BASE_URL);
        assert_eq!(settings.ai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.inbox.chat_digest_limit, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.ai.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"database": {"path": "/tmp/agent.db"}, "ai": {"base_url": "http://localhost:11434/v1"}}"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("/tmp/agent.db"));
        assert_eq!(settings.ai.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut settings = Settings::default();
        settings.ai.base_url = "not a url".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut settings = Settings::default();
        settings.ai.temperature = 3.5;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidTemperature(t)) if t == 3.5
        ));
    }

    #[test]
    fn settings_roundtrip() {
        let mut settings = Settings::default();
        settings.ai.max_tokens = Some(512);
        settings.inbox.chat_digest_limit = 5;

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.ai.max_tokens, Some(512));
        assert_eq!(deserialized.inbox.chat_digest_limit, 5);
    }
}
