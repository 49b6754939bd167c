use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_AWESOMEAPI_URL: &str = "https://economia.awesomeapi.com.br";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AwesomeApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after a network failure. Zero disables retrying.
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for AwesomeApiConfig {
    fn default() -> Self {
        AwesomeApiConfig {
            base_url: DEFAULT_AWESOMEAPI_URL.to_string(),
            timeout_secs: 10,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub awesomeapi: AwesomeApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// defaults when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxledger", "fxledger")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "fxledger", "fxledger")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        // An empty file deserializes to `null`; treat it as all defaults.
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.providers.awesomeapi.timeout_secs > 0,
            "providers.awesomeapi.timeout_secs must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  awesomeapi:
    base_url: "http://example.com/rates"
    timeout_secs: 3
    retries: 2
    retry_delay_ms: 100
data_path: "/tmp/fxledger"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let api = &config.providers.awesomeapi;
        assert_eq!(api.base_url, "http://example.com/rates");
        assert_eq!(api.timeout_secs, 3);
        assert_eq!(api.retries, 2);
        assert_eq!(api.retry_delay_ms, 100);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/fxledger"));
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/tmp/fxledger"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
providers:
  awesomeapi:
    base_url: "http://localhost:9000"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let api = &config.providers.awesomeapi;
        assert_eq!(api.base_url, "http://localhost:9000");
        assert_eq!(api.timeout_secs, 10);
        assert_eq!(api.retries, 0);
        assert!(config.data_path.is_none());

        let config: AppConfig = serde_yaml::from_str("data_path: /srv/fx").unwrap();
        assert_eq!(config.providers.awesomeapi.base_url, DEFAULT_AWESOMEAPI_URL);
    }

    #[test]
    fn test_load_from_empty_file() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_zero_timeout_is_rejected() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(
            file.path(),
            "providers:\n  awesomeapi:\n    timeout_secs: 0\n",
        )?;

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("timeout_secs must be at least 1"));
        assert!(AppConfig::default().validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
