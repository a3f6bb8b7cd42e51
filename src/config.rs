//! Configuration module
//!
//! Application settings are read from a TOML file
//! (`~/.config/fuel-calculator/config.toml` by default). Every section has
//! defaults, so a missing file or a partial file is fine.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{validate, CalculationInput, RawInput, ValidationErrors};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "FUEL_CALCULATOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid calculator defaults: {0}")]
    InvalidDefaults(ValidationErrors),
}

/// `~/.config/fuel-calculator/config.toml`, or `./config.toml` when no
/// config dir can be determined.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("fuel-calculator").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// `$FUEL_CALCULATOR_CONFIG` if set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub calculator: CalculatorConfig,
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        std::fs::write(path, text).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calculator
            .defaults()
            .validate()
            .map(|_| ())
            .map_err(ConfigError::InvalidDefaults)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` are believed
    pub trusted_proxies: Vec<IpAddr>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
            trusted_proxies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub users: Vec<UserConfig>,
    pub api_keys: Vec<ApiKeyConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "super-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            users: Vec::new(),
            api_keys: Vec::new(),
        }
    }
}

/// Account allowed to log in and receive a JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// bcrypt hash (`fuel-calculator hash-password`)
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
}

/// Pre-shared API key, stored as its SHA-256 hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub name: String,
    /// Hex SHA-256 of the full key (`fuel-calculator generate-api-key`)
    pub key_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "operator".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub default_distance: f64,
    pub default_fuel_consumption: f64,
    pub default_fuel_price: f64,
    /// How long a form session keeps its last result
    pub session_ttl_secs: u64,
}

impl CalculatorConfig {
    pub fn defaults(&self) -> CalculatorDefaults {
        CalculatorDefaults {
            default_distance: self.default_distance,
            default_fuel_consumption: self.default_fuel_consumption,
            default_fuel_price: self.default_fuel_price,
        }
    }

    pub fn set_defaults(&mut self, defaults: CalculatorDefaults) {
        self.default_distance = defaults.default_distance;
        self.default_fuel_consumption = defaults.default_fuel_consumption;
        self.default_fuel_price = defaults.default_fuel_price;
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_distance: 100.0,
            default_fuel_consumption: 7.0,
            default_fuel_price: 1.8,
            session_ttl_secs: 3600,
        }
    }
}

/// Prefill values for the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatorDefaults {
    pub default_distance: f64,
    pub default_fuel_consumption: f64,
    pub default_fuel_price: f64,
}

impl CalculatorDefaults {
    /// Defaults obey the same bounds as calculator input.
    pub fn validate(&self) -> Result<CalculationInput, ValidationErrors> {
        validate(&RawInput::new(
            self.default_distance,
            self.default_fuel_consumption,
            self.default_fuel_price,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.format, "text");
        assert_eq!(cfg.calculator.default_distance, 100.0);
        assert!(cfg.security.users.is_empty());
    }

    #[test]
    fn partial_sections_are_merged_with_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [calculator]
            default_fuel_price = 2.05

            [[security.api_keys]]
            name = "integration"
            key_hash = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.server.trusted_proxies.is_empty());
        assert_eq!(cfg.calculator.default_fuel_price, 2.05);
        assert_eq!(cfg.calculator.default_fuel_consumption, 7.0);
        assert_eq!(cfg.security.api_keys[0].role, "operator");
    }

    #[test]
    fn trusted_proxies_parse_as_addresses() {
        let cfg =
            AppConfig::from_toml("[server]\ntrusted_proxies = [\"10.0.0.1\", \"::1\"]\n").unwrap();
        assert_eq!(
            cfg.server.trusted_proxies,
            vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]
        );
        assert!(AppConfig::from_toml("[server]\ntrusted_proxies = [\"proxy\"]\n").is_err());
    }

    #[test]
    fn out_of_range_defaults_are_rejected() {
        let err = AppConfig::from_toml("[calculator]\ndefault_distance = 20000.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefaults(_)));
        assert!(err.to_string().contains("Distance must be between 0.1 and 10000"));
    }

    #[test]
    fn save_and_load_keeps_values() {
        let path = std::env::temp_dir()
            .join(format!("fuel-calculator-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.calculator.default_distance = 42.5;
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.calculator.default_distance, 42.5);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.calculator.session_ttl_secs, 3600);
    }
}
