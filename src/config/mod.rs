//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::session::SessionLimits;
use crate::core::summary::PageSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service configuration
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Fixed delay applied to every login attempt, in milliseconds
    pub login_delay_ms: u64,

    /// Upper bound on the declared box count of an order
    pub max_boxes: u32,

    /// Upper bound on the number of distribution entries
    pub max_distribution_entries: usize,

    /// Page format reported to the print collaborator
    pub page_size: PageSize,

    /// YAML user store; without it every login is rejected
    pub users_file: Option<PathBuf>,

    /// Answer cross-origin requests from any origin
    pub cors_allow_any: bool,

    /// Sessions untouched for this many seconds are discarded
    pub session_idle_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            login_delay_ms: 500,
            max_boxes: 500,
            max_distribution_entries: 500,
            page_size: PageSize::A4,
            users_file: None,
            cors_allow_any: false,
            session_idle_timeout_secs: 1800,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => e.into(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `NURSERY_BIND_ADDR` and `NURSERY_USERS_FILE` if set
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("NURSERY_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Ok(v) = std::env::var("NURSERY_USERS_FILE") {
            self.users_file = Some(PathBuf::from(v));
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "bind_addr".to_string(),
                value: self.bind_addr.clone(),
                message: "expected host:port".to_string(),
            });
        }
        if self.max_boxes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_boxes".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_distribution_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_distribution_entries".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_idle_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session_idle_timeout_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            max_boxes: self.max_boxes,
            max_distribution_entries: self.max_distribution_entries,
        }
    }
}
