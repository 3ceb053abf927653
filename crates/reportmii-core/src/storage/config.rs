//! TOML-based application configuration.
//!
//! Stores:
//! - Add-on pricing (included block quota, unit price, currency)
//! - Checkout redirect base URL
//! - Submission notification settings
//! - The catalog new analyses start from
//!
//! Configuration is stored at `~/.config/reportmii/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::blocks::PricingPolicy;
use crate::catalog::{CatalogKind, DEFAULT_ACTIVE_BLOCKS};
use crate::error::{ConfigError, WizardError};

/// Add-on pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_included_blocks")]
    pub included_blocks: usize,
    #[serde(default = "default_unit_addon_price")]
    pub unit_addon_price: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Checkout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_checkout_url")]
    pub base_url: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Endpoint receiving the "analysis submitted" event.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/reportmii/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_catalog")]
    pub default_catalog: String,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_included_blocks() -> usize {
    DEFAULT_ACTIVE_BLOCKS
}
fn default_unit_addon_price() -> u32 {
    39
}
fn default_currency() -> String {
    "EUR".into()
}
fn default_checkout_url() -> String {
    "https://checkout.reportmii.com/pay".into()
}
fn default_catalog() -> String {
    CatalogKind::Business.as_str().into()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            included_blocks: default_included_blocks(),
            unit_addon_price: default_unit_addon_price(),
            currency: default_currency(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            base_url: default_checkout_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_catalog: default_catalog(),
            pricing: PricingConfig::default(),
            checkout: CheckoutConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Strings and unset optional values
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing and returning the default when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.catalog_kind().map_err(|e| ConfigError::InvalidValue {
            key: "default_catalog".to_string(),
            message: e.to_string(),
        })?;
        if self.pricing.currency.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pricing.currency".to_string(),
                message: "currency must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn catalog_kind(&self) -> Result<CatalogKind, WizardError> {
        self.default_catalog.parse()
    }

    /// Pricing constants for new analyses.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            included_blocks: self.pricing.included_blocks,
            unit_addon_price: self.pricing.unit_addon_price,
            currency: self.pricing.currency.clone(),
        }
    }
}
