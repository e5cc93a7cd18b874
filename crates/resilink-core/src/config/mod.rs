//! Configuration loaded from `~/.config/resilink/config.toml`.
//!
//! Global `[retry]` and `[breaker]` sections apply to every integration;
//! `[integrations.<name>]` tables override individual fields.

mod error;
mod sections;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;

pub use error::ConfigError;
pub use sections::{
    BreakerOverrides, BreakerSettings, DlqBackend, DlqSettings, IntegrationSettings,
    RetryOverrides, RetrySettings, TransportSettings,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub retry: RetrySettings,
    pub breaker: BreakerSettings,
    pub dlq: DlqSettings,
    pub transport: TransportSettings,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub integrations: BTreeMap<String, IntegrationSettings>,
}

impl ResilienceConfig {
    /// Effective client configuration for `integration`: global sections with
    /// that integration's overrides applied.
    pub fn client_config(&self, integration: &str) -> Result<ClientConfig, ConfigError> {
        let (retry, breaker) = match self.integrations.get(integration) {
            Some(o) => (self.retry.merged(&o.retry), self.breaker.merged(&o.breaker)),
            None => (self.retry.clone(), self.breaker.clone()),
        };
        let cfg = ClientConfig {
            integration_name: integration.to_string(),
            retry: retry.to_policy(),
            breaker: breaker.to_config(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the global sections and every override table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.to_policy().validate()?;
        self.breaker.to_config().validate()?;
        for name in self.integrations.keys() {
            self.client_config(name).map_err(|e| match e {
                ConfigError::Invalid {
                    field,
                    requirement,
                    value,
                } => ConfigError::Invalid {
                    field: format!("integrations.{name}.{field}"),
                    requirement,
                    value,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resilink")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ResilienceConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<ResilienceConfig> {
    if !path.exists() {
        let default_cfg = ResilienceConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ResilienceConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests;
