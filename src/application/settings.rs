//! Editable calculator defaults
//!
//! Holds the prefill values used by the form. Updates are checked against
//! the field bounds and, when the service was started from a config file,
//! written back to that file. Only the `[calculator]` section of the file
//! changes; runtime overrides (CLI port, log level) never reach it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{AppConfig, CalculatorDefaults, ConfigError};
use crate::domain::ValidationErrors;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid defaults: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("failed to persist settings: {0}")]
    Persist(#[from] ConfigError),

    #[error("settings task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct SettingsStore {
    config: RwLock<AppConfig>,
    persist_path: Option<PathBuf>,
}

impl SettingsStore {
    /// In-memory only; updates are lost on restart.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
            persist_path: None,
        }
    }

    /// Updates are written back to `path`.
    pub fn persistent(config: AppConfig, path: PathBuf) -> Self {
        Self {
            config: RwLock::new(config),
            persist_path: Some(path),
        }
    }

    pub async fn defaults(&self) -> CalculatorDefaults {
        self.config.read().await.calculator.defaults()
    }

    /// Replace the defaults. Nothing changes if validation or persistence fails.
    pub async fn update(
        &self,
        defaults: CalculatorDefaults,
    ) -> Result<CalculatorDefaults, SettingsError> {
        defaults.validate()?;

        let mut config = self.config.write().await;
        let mut updated = config.clone();
        updated.calculator.set_defaults(defaults);

        if let Some(path) = self.persist_path.clone() {
            tokio::task::spawn_blocking(move || persist_defaults(&path, defaults)).await??;
        }

        *config = updated;
        info!(
            distance = defaults.default_distance,
            consumption = defaults.default_fuel_consumption,
            price = defaults.default_fuel_price,
            "Calculator defaults updated"
        );
        Ok(defaults)
    }
}

/// Rewrite the calculator defaults in the file at `path`, leaving every
/// other section as it is on disk.
fn persist_defaults(path: &Path, defaults: CalculatorDefaults) -> Result<(), ConfigError> {
    let mut on_disk = AppConfig::load(path)?;
    on_disk.calculator.set_defaults(defaults);
    on_disk.save(path)
}
