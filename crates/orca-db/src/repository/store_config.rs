//! # Store Config Repository
//!
//! Per-store pricing parameters, provisioned lazily.
//!
//! ## Lazy Provisioning
//! ```text
//! get_or_create("loja-9")
//!      │
//!      ├── INSERT ... ON CONFLICT (store_id) DO NOTHING   ← defaults
//!      │        rows_affected = 1 → created = true
//!      │
//!      └── SELECT ... WHERE store_id = ?                  ← whatever won
//! ```
//! Two callers racing on a brand-new store both end up reading the same
//! row; exactly one of them reports `created`.

use chrono::Utc;
use orca_core::validation::{validate_identifier, validate_store_config};
use orca_core::{Money, StoreConfig, StoreConfigDefaults};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::parse_rate;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct StoreConfigRow {
    store_id: String,
    factory_cost_deflator: String,
    freight_percentage: String,
    default_measurer_cost_cents: i64,
    vendor_discount_limit: String,
    manager_discount_limit: String,
}

impl TryFrom<StoreConfigRow> for StoreConfig {
    type Error = DbError;

    fn try_from(row: StoreConfigRow) -> DbResult<Self> {
        Ok(StoreConfig {
            factory_cost_deflator: parse_rate("factory_cost_deflator", &row.factory_cost_deflator)?,
            freight_percentage: parse_rate("freight_percentage", &row.freight_percentage)?,
            default_measurer_cost: Money::from_cents(row.default_measurer_cost_cents),
            vendor_discount_limit: parse_rate("vendor_discount_limit", &row.vendor_discount_limit)?,
            manager_discount_limit: parse_rate(
                "manager_discount_limit",
                &row.manager_discount_limit,
            )?,
            store_id: row.store_id,
        })
    }
}

/// Result of [`StoreConfigRepository::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedConfig {
    pub config: StoreConfig,
    /// `true` when this call inserted the defaults.
    pub created: bool,
}

/// Repository for store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfigRepository {
    pool: SqlitePool,
    defaults: StoreConfigDefaults,
}

impl StoreConfigRepository {
    pub fn new(pool: SqlitePool, defaults: StoreConfigDefaults) -> Self {
        StoreConfigRepository { pool, defaults }
    }

    /// Gets a store's configuration without provisioning it.
    pub async fn get(&self, store_id: &str) -> DbResult<Option<StoreConfig>> {
        let row: Option<StoreConfigRow> = sqlx::query_as(
            r#"
            SELECT
                store_id,
                factory_cost_deflator,
                freight_percentage,
                default_measurer_cost_cents,
                vendor_discount_limit,
                manager_discount_limit
            FROM store_configs
            WHERE store_id = ?1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoreConfig::try_from).transpose()
    }

    /// Returns the store's configuration, inserting the defaults first if the
    /// store has never been configured. Never reports "not found".
    pub async fn get_or_create(&self, store_id: &str) -> DbResult<ProvisionedConfig> {
        validate_identifier("store_id", store_id)?;

        let defaults = StoreConfig::with_defaults(store_id, &self.defaults);
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO store_configs (
                store_id, factory_cost_deflator, freight_percentage,
                default_measurer_cost_cents, vendor_discount_limit, manager_discount_limit,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (store_id) DO NOTHING
            "#,
        )
        .bind(&defaults.store_id)
        .bind(defaults.factory_cost_deflator.to_string())
        .bind(defaults.freight_percentage.to_string())
        .bind(defaults.default_measurer_cost.cents())
        .bind(defaults.vendor_discount_limit.to_string())
        .bind(defaults.manager_discount_limit.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let created = inserted == 1;
        if created {
            info!(store_id = %store_id, "Provisioned store config with defaults");
        }

        let config = self
            .get(store_id)
            .await?
            .ok_or_else(|| DbError::not_found("StoreConfig", store_id))?;

        Ok(ProvisionedConfig { config, created })
    }

    /// Inserts or replaces a store's configuration (administrator action).
    ///
    /// ## Errors
    /// `DbError::Core(Validation)` when a rate is outside `[0, 1]`, the
    /// measurer cost is negative, or the vendor limit exceeds the manager's.
    pub async fn upsert(&self, config: &StoreConfig) -> DbResult<()> {
        validate_store_config(config)?;

        debug!(store_id = %config.store_id, "Upserting store config");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO store_configs (
                store_id, factory_cost_deflator, freight_percentage,
                default_measurer_cost_cents, vendor_discount_limit, manager_discount_limit,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (store_id) DO UPDATE SET
                factory_cost_deflator = excluded.factory_cost_deflator,
                freight_percentage = excluded.freight_percentage,
                default_measurer_cost_cents = excluded.default_measurer_cost_cents,
                vendor_discount_limit = excluded.vendor_discount_limit,
                manager_discount_limit = excluded.manager_discount_limit,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&config.store_id)
        .bind(config.factory_cost_deflator.to_string())
        .bind(config.freight_percentage.to_string())
        .bind(config.default_measurer_cost.cents())
        .bind(config.vendor_discount_limit.to_string())
        .bind(config.manager_discount_limit.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
