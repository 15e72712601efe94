//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `session.secret_key`.
pub const SECRET_KEY_ENV: &str = "HRMS_AES_SECRET_KEY";

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HR API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Local session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Static secret for session encryption. `HRMS_AES_SECRET_KEY` wins when set.
    #[serde(default)]
    pub secret_key: String,
    /// Lifetime of a remembered login in days (default: 7).
    #[serde(default = "default_remember_days")]
    pub remember_days: u32,
    /// Lifetime of a login without "remember me" in hours (default: 12).
    #[serde(default = "default_session_hours")]
    pub session_hours: u32,
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

fn default_remember_days() -> u32 {
    7
}

fn default_session_hours() -> u32 {
    12
}

fn default_kdf_iterations() -> u32 {
    100_000
}

/// Export header and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub company_name: String,
    pub output_dir: PathBuf,
}

/// Client-side report paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub page_size: usize,
}

/// Log file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the rolling log file. Defaults to `<data dir>/logs`.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Get config file path in the platform config directory.
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(mut config) => {
                    config.apply_env();
                    match config.validate() {
                        Ok(()) => ConfigLoadResult::Loaded(config),
                        Err(e) => ConfigLoadResult::Invalid(e),
                    }
                }
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Pick up overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var(SECRET_KEY_ENV)
            && !secret.trim().is_empty()
        {
            self.session.secret_key = secret;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
        }
        if !self.api.base_url.starts_with("http") {
            return Err(ConfigError::Validation(
                "API base URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "API timeout must be at least 5 seconds".to_string(),
            ));
        }
        if self.session.remember_days < 1 {
            return Err(ConfigError::Validation(
                "Remember-me lifetime must be at least 1 day".to_string(),
            ));
        }
        if self.session.session_hours < 1 {
            return Err(ConfigError::Validation(
                "Session lifetime must be at least 1 hour".to_string(),
            ));
        }
        if u64::from(self.session.session_hours) >= u64::from(self.session.remember_days) * 24 {
            return Err(ConfigError::Validation(
                "Session lifetime must be shorter than the remember-me lifetime".to_string(),
            ));
        }
        if self.session.kdf_iterations < 1 {
            return Err(ConfigError::Validation(
                "KDF iterations must be greater than 0".to_string(),
            ));
        }
        if self.report.page_size == 0 {
            return Err(ConfigError::Validation(
                "Report page size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory for the rolling log file.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .unwrap_or_else(|| data_dir().join("logs"))
    }
}

/// Platform data directory (persistent session, logs).
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Per-user runtime directory for the session-scoped login. Falls back to
/// `<data dir>/run` where the platform has no runtime dir.
pub fn runtime_dir() -> PathBuf {
    project_dirs()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| data_dir().join("run"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hrms", "hrms-reports")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            remember_days: default_remember_days(),
            session_hours: default_session_hours(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            company_name: "Company".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { page_size: 25 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "ftp://invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_timeout_and_page_size() {
        let mut config = AppConfig::default();

        config.api.timeout_secs = 2;
        assert!(config.validate().is_err());

        config.api.timeout_secs = 30;
        config.report.page_size = 0;
        assert!(config.validate().is_err());

        config.report.page_size = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_session_shorter_than_remembered() {
        let mut config = AppConfig::default();
        assert_eq!(config.session.session_hours, 12);

        config.session.session_hours = 0;
        assert!(config.validate().is_err());

        config.session.session_hours = 7 * 24;
        assert!(config.validate().is_err());

        config.session.session_hours = 7 * 24 - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://hr.example.com/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.remember_days, 7);
        assert_eq!(config.report.page_size, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.export.company_name = "Acme Textiles".to_string();
        config.save(&path).unwrap();

        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => assert_eq!(loaded.export.company_name, "Acme Textiles"),
            other => panic!("unexpected load result: {other:?}"),
        }
    }

    #[test]
    fn test_try_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::try_load(&dir.path().join("absent.toml")),
            ConfigLoadResult::Missing
        ));
    }
}
