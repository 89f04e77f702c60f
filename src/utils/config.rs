//! Configuration management for the peer checker.
//!
//! This module provides TOML-based configuration with support for multiple
//! configuration sources (default, file-based, environment variables) and
//! validation of configuration parameters.

use crate::utils::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "peer-checker.toml";

/// Environment variable prefix for configuration
pub const ENV_PREFIX: &str = "PEER_CHECKER";

/// Complete configuration for the checker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Probe engine configuration
    pub probe: ProbeConfig,
    /// Peer list scanning configuration
    pub discovery: DiscoveryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Probe engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// TCP/TLS connect timeout in seconds
    pub connect_timeout: u64,
    /// QUIC idle timeout in seconds, bounding the handshake (library default if unset)
    pub quic_idle_timeout: Option<u64>,
}

/// Peer list scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Top-level directories that are never treated as regions
    pub excluded_dirs: Vec<String>,
    /// File name suffix of country files
    pub file_suffix: String,
    /// Only scan these regions (all when empty)
    pub regions: Vec<String>,
    /// Only scan these country files (all when empty)
    pub countries: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: crate::defaults::DEFAULT_CONNECT_TIMEOUT,
            quic_idle_timeout: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: crate::defaults::EXCLUDED_DIRS
                .iter()
                .map(ToString::to_string)
                .collect(),
            file_suffix: crate::defaults::COUNTRY_FILE_SUFFIX.to_string(),
            regions: Vec::new(),
            countries: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl ProbeConfig {
    /// TCP/TLS connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// QUIC idle timeout, if overridden
    pub fn quic_idle_timeout(&self) -> Option<Duration> {
        self.quic_idle_timeout.map(Duration::from_secs)
    }
}

impl CheckerConfig {
    /// Parse and validate a TOML file
    ///
    /// Sections and keys missing from the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self = toml::from_str(&content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, overlaid by the first config file found, overlaid by the environment
    ///
    /// See [`CheckerConfig::locate`] for which file is used.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let base = match Self::locate(config_file) {
            Some(path) => Self::default().merge(Self::from_file(path)?),
            None => Self::default(),
        };

        let config = base.merge_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Config file to read: `explicit` as given, else the first existing
    /// entry of [`CheckerConfig::search_paths`]
    ///
    /// An explicit path is returned even if it does not exist, so that
    /// [`CheckerConfig::from_file`] reports it.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.is_file()),
        }
    }

    /// Implicit config locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("peer-checker").join(DEFAULT_CONFIG_FILE));
        }
        paths
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Merge this configuration with another, preferring values from other
    pub fn merge(mut self, other: Self) -> Self {
        self.probe = other.probe;
        self.discovery = other.discovery;
        self.logging = other.logging;
        self
    }

    /// Merge configuration from environment variables
    fn merge_from_env(mut self) -> Result<Self> {
        if let Some(secs) = env_secs("PROBE_CONNECT_TIMEOUT")? {
            self.probe.connect_timeout = secs;
        }

        if let Some(secs) = env_secs("PROBE_QUIC_IDLE_TIMEOUT")? {
            self.probe.quic_idle_timeout = Some(secs);
        }

        if let Ok(level) = std::env::var(format!("{ENV_PREFIX}_LOGGING_LEVEL")) {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        if self.probe.connect_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.connect_timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.probe.quic_idle_timeout == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "probe.quic_idle_timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.discovery.file_suffix.is_empty() {
            return Err(ConfigError::MissingField {
                field: "discovery.file_suffix".to_string(),
            }
            .into());
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    value: self.logging.level.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Get the configuration as a pretty-printed TOML string
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::ParseError {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn env_secs(key: &str) -> Result<Option<u64>> {
    let name = format!("{ENV_PREFIX}_{key}");
    match std::env::var(&name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { field: name, value }.into()),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CheckerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.probe.quic_idle_timeout(), None);
        assert_eq!(config.discovery.excluded_dirs, vec![".git", "other"]);
        assert_eq!(config.discovery.file_suffix, ".md");
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = CheckerConfig::default();
        config.probe.connect_timeout = 2;
        config.discovery.regions = vec!["europe".to_string()];
        let temp_file = NamedTempFile::new().unwrap();

        config.save(temp_file.path()).unwrap();
        let loaded = CheckerConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(loaded.probe.connect_timeout, 2);
        assert_eq!(loaded.discovery.regions, vec!["europe"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[probe]\nquic_idle_timeout = 3\n").unwrap();

        let loaded = CheckerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.probe.quic_idle_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(loaded.probe.connect_timeout, 5);
        assert_eq!(loaded.discovery.file_suffix, ".md");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = CheckerConfig::load(Some(Path::new("/nonexistent/peer-checker.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let explicit = Path::new("/nonexistent/custom.toml");
        assert_eq!(CheckerConfig::locate(Some(explicit)), Some(explicit.to_path_buf()));

        let paths = CheckerConfig::search_paths();
        assert_eq!(paths[0], PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(paths.iter().all(|p| p.ends_with(DEFAULT_CONFIG_FILE)));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[probe\nconnect_timeout = ").unwrap();

        let err = CheckerConfig::from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, crate::utils::CheckerError::Config(ConfigError::Toml(_))));
    }

    #[test]
    fn test_config_validation() {
        let mut config = CheckerConfig::default();
        config.probe.connect_timeout = 0;
        assert!(config.validate().is_err());

        config = CheckerConfig::default();
        config.discovery.file_suffix.clear();
        assert!(config.validate().is_err());

        config = CheckerConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("PEER_CHECKER_PROBE_CONNECT_TIMEOUT", "9");

        let config = CheckerConfig::default().merge_from_env().unwrap();
        assert_eq!(config.probe.connect_timeout, 9);

        std::env::remove_var("PEER_CHECKER_PROBE_CONNECT_TIMEOUT");
    }
}
