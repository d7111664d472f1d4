//! Orca runtime configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                      | Default            |
//! |-------------------------------|--------------------|
//! | `ORCA_DATABASE_PATH`          | `./orca.db`        |
//! | `ORCA_MAX_CONNECTIONS`        | `5`                |
//! | `ORCA_BUDGET_NUMBER_PREFIX`   | `ORC`              |
//! | `ORCA_DEFAULT_DEFLATOR`       | `0.30`             |
//! | `ORCA_DEFAULT_FREIGHT`        | `0.02`             |
//! | `ORCA_DEFAULT_MEASURER_CENTS` | `15000`            |
//! | `ORCA_DEFAULT_VENDOR_LIMIT`   | `0.10`             |
//! | `ORCA_DEFAULT_MANAGER_LIMIT`  | `0.20`             |

use orca_core::validation::validate_store_config;
use orca_core::{Money, StoreConfig, StoreConfigDefaults};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pool::DbConfig;

/// Orca configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrcaConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Budget numbers render as `{prefix}-{seq:06}`
    pub budget_number_prefix: String,

    /// Values a brand-new store is provisioned with
    pub store_defaults: StoreConfigDefaults,
}

impl OrcaConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests pass a map).
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let standard = StoreConfigDefaults::standard();

        let store_defaults = StoreConfigDefaults {
            factory_cost_deflator: parse_or(
                &lookup,
                "ORCA_DEFAULT_DEFLATOR",
                standard.factory_cost_deflator,
            )?,
            freight_percentage: parse_or(
                &lookup,
                "ORCA_DEFAULT_FREIGHT",
                standard.freight_percentage,
            )?,
            default_measurer_cost: Money::from_cents(parse_or(
                &lookup,
                "ORCA_DEFAULT_MEASURER_CENTS",
                standard.default_measurer_cost.cents(),
            )?),
            vendor_discount_limit: parse_or(
                &lookup,
                "ORCA_DEFAULT_VENDOR_LIMIT",
                standard.vendor_discount_limit,
            )?,
            manager_discount_limit: parse_or(
                &lookup,
                "ORCA_DEFAULT_MANAGER_LIMIT",
                standard.manager_discount_limit,
            )?,
        };

        // Same rules an administrator's store config must satisfy
        validate_store_config(&StoreConfig::with_defaults("defaults", &store_defaults))
            .map_err(|e| ConfigError::InvalidDefaults(e.to_string()))?;

        let budget_number_prefix = lookup("ORCA_BUDGET_NUMBER_PREFIX")
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| "ORC".to_string());
        if budget_number_prefix.is_empty() {
            return Err(ConfigError::InvalidValue("ORCA_BUDGET_NUMBER_PREFIX".to_string()));
        }

        let max_connections: u32 = parse_or(&lookup, "ORCA_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("ORCA_MAX_CONNECTIONS".to_string()));
        }

        Ok(OrcaConfig {
            database_path: lookup("ORCA_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./orca.db")),
            max_connections,
            budget_number_prefix,
            store_defaults,
        })
    }

    /// Database configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .budget_number_prefix(self.budget_number_prefix.clone())
            .store_defaults(self.store_defaults)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid store defaults: {0}")]
    InvalidDefaults(String),
}
